use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AccumError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AccumError::lifecycle("x")
            .to_string()
            .contains("lifecycle error:")
    );
    assert!(
        AccumError::compilation("x")
            .to_string()
            .contains("compilation error:")
    );
    assert!(
        AccumError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        AccumError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AccumError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: AccumError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, AccumError::Serde(_)));
}
