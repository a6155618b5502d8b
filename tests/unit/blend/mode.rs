use super::*;

#[test]
fn identifiers_are_unique_and_round_trip() {
    let all = BlendMode::all();
    assert_eq!(all.len(), 25);
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a.id(), b.id());
        }
        assert_eq!(BlendMode::lookup(a.id()), Some(*a));
    }
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(BlendMode::lookup("ColorDodge"), Some(BlendMode::ColorDodge));
    assert_eq!(BlendMode::lookup(" SCREEN "), Some(BlendMode::Screen));
}

#[test]
fn legacy_substract_spelling_maps_to_subtract() {
    assert_eq!(BlendMode::lookup("substract"), Some(BlendMode::Subtract));
    assert_eq!(BlendMode::from_name("Substract"), BlendMode::Subtract);
}

#[test]
fn unknown_names_fall_back_to_normal() {
    assert_eq!(BlendMode::from_name("luminosity"), BlendMode::Normal);
    assert_eq!(BlendMode::from_name(""), BlendMode::Normal);
    assert!("luminosity".parse::<BlendMode>().is_err());
}

#[test]
fn only_normal_mixes_alpha() {
    for mode in BlendMode::all() {
        assert_eq!(mode.mixes_alpha(), *mode == BlendMode::Normal, "{mode}");
    }
}

#[test]
fn serde_uses_identifiers_and_is_permissive() {
    let json = serde_json::to_string(&BlendMode::SoftLight).unwrap();
    assert_eq!(json, "\"softlight\"");
    let back: BlendMode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, BlendMode::SoftLight);
    let unknown: BlendMode = serde_json::from_str("\"bogus\"").unwrap();
    assert_eq!(unknown, BlendMode::Normal);
}

#[test]
fn labels_match_menu_text() {
    assert_eq!(BlendMode::HardMix.to_string(), "Hard Mix");
    assert_eq!(BlendMode::default(), BlendMode::Normal);
}
