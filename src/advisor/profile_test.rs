use super::*;
use serial_test::serial;

/// # Safety
/// Callers are `#[serial]` so no other test touches the environment concurrently.
unsafe fn clear_profile_env() {
    unsafe {
        std::env::remove_var("ADVISOR_PROFILE");
        std::env::remove_var("ADVISOR_TEMPERATURE");
    }
}

#[test]
fn consultant_enables_image_and_grounding() {
    let p = AdvisorProfile::consultant();
    assert!(p.supports_image);
    assert!(p.supports_grounding);
    assert!((p.temperature - 0.7).abs() < f32::EPSILON);
    assert!(p.system_instruction.contains("ACL Móveis Planejados"));
    assert!(p.greeting.starts_with("Olá!"));
}

#[test]
fn concierge_is_text_only_and_warmer() {
    let p = AdvisorProfile::concierge();
    assert!(!p.supports_image);
    assert!(!p.supports_grounding);
    assert!((p.temperature - 0.8).abs() < f32::EPSILON);
    assert_eq!(p.fallback_text, AdvisorProfile::consultant().fallback_text);
    assert_ne!(p.system_instruction, AdvisorProfile::consultant().system_instruction);
}

#[test]
fn by_name_rejects_unknown() {
    let err = AdvisorProfile::by_name("butler").unwrap_err();
    assert_eq!(err, ProfileError::UnknownProfile("butler".into()));
}

#[test]
fn parse_temperature_bounds() {
    assert!((parse_temperature("1.5").unwrap() - 1.5).abs() < f32::EPSILON);
    assert!(parse_temperature("0").is_ok());
    assert!(parse_temperature("2.5").is_err());
    assert!(parse_temperature("-0.1").is_err());
    assert!(parse_temperature("warm").is_err());
}

#[test]
#[serial]
fn from_env_defaults_to_consultant() {
    unsafe { clear_profile_env() };
    assert_eq!(AdvisorProfile::from_env().unwrap(), AdvisorProfile::consultant());
}

#[test]
#[serial]
fn from_env_applies_profile_and_temperature() {
    unsafe {
        clear_profile_env();
        std::env::set_var("ADVISOR_PROFILE", "concierge");
        std::env::set_var("ADVISOR_TEMPERATURE", "0.3");
    }

    let p = AdvisorProfile::from_env().unwrap();
    assert_eq!(p.name, "concierge");
    assert!((p.temperature - 0.3).abs() < f32::EPSILON);

    unsafe { clear_profile_env() };
}

#[test]
#[serial]
fn from_env_invalid_temperature_errors() {
    unsafe {
        clear_profile_env();
        std::env::set_var("ADVISOR_TEMPERATURE", "hot");
    }

    let err = AdvisorProfile::from_env().unwrap_err().to_string();
    assert!(err.contains("ADVISOR_TEMPERATURE"));

    unsafe { clear_profile_env() };
}
