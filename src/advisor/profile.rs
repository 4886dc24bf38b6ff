//! Advisor profiles — persona, sampling, and capability switches.
//!
//! DESIGN
//! ======
//! The chat widget shipped in two flavours that differed only in prompt,
//! temperature, and whether photos and web grounding were enabled. Both are
//! presets of one `AdvisorProfile`; `ADVISOR_PROFILE` picks one at startup
//! and `ADVISOR_TEMPERATURE` may override its temperature.

const CONSULTANT_INSTRUCTION: &str = "\
Você é o Consultor Técnico de Projetos da ACL Móveis Planejados.
Sua especialidade é ajudar clientes a idealizar ambientes sob medida (Cozinhas, Dormitórios, Salas, etc.).

Diretrizes de Atendimento:
1. FOCO EM PLANEJADOS: Fale sobre aproveitamento de espaço, materiais (MDF, acabamentos), ferragens e funcionalidade.
2. ESTILO ACL: Sugira designs modernos que utilizam a paleta da marca (vermelho de destaque, preto elegante e tons neutros).
3. TÉCNICO E INSPIRADOR: Se o usuário enviar uma foto de um ambiente vazio ou antigo, analise pontos de melhoria e sugira uma disposição de móveis planejados.
4. FLUXO DE VENDA: Encoraje o usuário a agendar uma visita ao showroom ou solicitar um orçamento detalhado após a consultoria.

Use um tom profissional, atencioso e técnico. Responda sempre em Português do Brasil.
";

const CONCIERGE_INSTRUCTION: &str = "\
Você é o Concierge de Design da ACL Móveis Planejados.
Ajude o cliente a escolher móveis e composições para Sala de Estar, Sala de Jantar, Quarto, Escritório e Decoração.

Diretrizes de Atendimento:
1. Faça perguntas curtas sobre medidas, estilo e orçamento antes de sugerir.
2. Sugira combinações de materiais e cores alinhadas à identidade da marca.
3. Convide o cliente a visitar o showroom ou pedir um orçamento.

Seja cordial e objetivo. Responda sempre em Português do Brasil.
";

const CONSULTANT_GREETING: &str = "Olá! Sou o Consultor Digital da ACL Móveis. Como posso ajudar com seu projeto hoje? Envie uma foto do seu ambiente ou fale sobre suas ideias!";
const CONCIERGE_GREETING: &str =
    "Olá! Sou o Concierge de Design da ACL Móveis. Conte qual ambiente você quer transformar!";

const PLACEHOLDER_PROMPT: &str = "O que você sugere para planejar este espaço?";
const FALLBACK_TEXT: &str =
    "Estamos com alta demanda em nossos servidores de projeto. Por favor, tente novamente em instantes.";
const UNPROCESSABLE_TEXT: &str = "Desculpe, tive um problema ao processar seu pedido de projeto.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("unknown ADVISOR_PROFILE: {0} (expected 'consultant' or 'concierge')")]
    UnknownProfile(String),
    #[error("invalid ADVISOR_TEMPERATURE: {0} (expected a number in 0.0..=2.0)")]
    InvalidTemperature(String),
}

/// Everything that distinguishes one advisor persona from another.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorProfile {
    pub name: &'static str,
    pub system_instruction: String,
    pub temperature: f32,
    /// Forward user photos upstream. When off, images are dropped.
    pub supports_image: bool,
    /// Ask the model for web-grounded answers with citations.
    pub supports_grounding: bool,
    /// First model turn of every transcript.
    pub greeting: String,
    /// Sent upstream when the user attached a photo but typed nothing.
    pub placeholder_prompt: String,
    /// Reply used when the generator call fails.
    pub fallback_text: String,
    /// Reply used when the generator succeeds without text.
    pub unprocessable_text: String,
}

impl AdvisorProfile {
    /// Technical project consultant: photos and web grounding enabled.
    #[must_use]
    pub fn consultant() -> Self {
        Self {
            name: "consultant",
            system_instruction: CONSULTANT_INSTRUCTION.to_string(),
            temperature: 0.7,
            supports_image: true,
            supports_grounding: true,
            greeting: CONSULTANT_GREETING.to_string(),
            placeholder_prompt: PLACEHOLDER_PROMPT.to_string(),
            fallback_text: FALLBACK_TEXT.to_string(),
            unprocessable_text: UNPROCESSABLE_TEXT.to_string(),
        }
    }

    /// Text-only concierge.
    #[must_use]
    pub fn concierge() -> Self {
        Self {
            name: "concierge",
            system_instruction: CONCIERGE_INSTRUCTION.to_string(),
            temperature: 0.8,
            supports_image: false,
            supports_grounding: false,
            greeting: CONCIERGE_GREETING.to_string(),
            ..Self::consultant()
        }
    }

    /// Select a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownProfile`] for anything but the two presets.
    pub fn by_name(name: &str) -> Result<Self, ProfileError> {
        match name.trim() {
            "consultant" => Ok(Self::consultant()),
            "concierge" => Ok(Self::concierge()),
            other => Err(ProfileError::UnknownProfile(other.to_string())),
        }
    }

    /// Build the profile from `ADVISOR_PROFILE` (default `consultant`) and
    /// the optional `ADVISOR_TEMPERATURE` override.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] for an unknown profile name or a temperature
    /// that does not parse or falls outside `0.0..=2.0`.
    pub fn from_env() -> Result<Self, ProfileError> {
        let mut profile = Self::by_name(
            std::env::var("ADVISOR_PROFILE")
                .as_deref()
                .unwrap_or("consultant"),
        )?;

        if let Ok(raw) = std::env::var("ADVISOR_TEMPERATURE") {
            profile.temperature = parse_temperature(&raw)?;
        }
        Ok(profile)
    }
}

impl Default for AdvisorProfile {
    fn default() -> Self {
        Self::consultant()
    }
}

fn parse_temperature(raw: &str) -> Result<f32, ProfileError> {
    match raw.trim().parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => Ok(t),
        _ => Err(ProfileError::InvalidTemperature(raw.to_string())),
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
