use winit::keyboard::KeyCode;

/// Physical keys the task listens to and the identifiers they report.
///
/// Letter and number-row keys report their character, numpad keys report
/// `num_<digit>`. Anything else is not delivered to the session.
pub const KEY_TABLE: &[(KeyCode, &str)] = &[
    (KeyCode::Escape, "escape"),
    (KeyCode::Space, "space"),
    (KeyCode::ArrowLeft, "left"),
    (KeyCode::ArrowRight, "right"),
    (KeyCode::KeyQ, "q"),
    (KeyCode::KeyW, "w"),
    (KeyCode::KeyE, "e"),
    (KeyCode::KeyA, "a"),
    (KeyCode::KeyS, "s"),
    (KeyCode::KeyD, "d"),
    (KeyCode::KeyZ, "z"),
    (KeyCode::KeyX, "x"),
    (KeyCode::KeyC, "c"),
    (KeyCode::Digit0, "0"),
    (KeyCode::Digit1, "1"),
    (KeyCode::Digit2, "2"),
    (KeyCode::Digit3, "3"),
    (KeyCode::Digit4, "4"),
    (KeyCode::Digit5, "5"),
    (KeyCode::Digit6, "6"),
    (KeyCode::Digit7, "7"),
    (KeyCode::Digit8, "8"),
    (KeyCode::Digit9, "9"),
    (KeyCode::Numpad0, "num_0"),
    (KeyCode::Numpad1, "num_1"),
    (KeyCode::Numpad2, "num_2"),
    (KeyCode::Numpad3, "num_3"),
    (KeyCode::Numpad4, "num_4"),
    (KeyCode::Numpad5, "num_5"),
    (KeyCode::Numpad6, "num_6"),
    (KeyCode::Numpad7, "num_7"),
    (KeyCode::Numpad8, "num_8"),
    (KeyCode::Numpad9, "num_9"),
];

pub fn key_identifier(code: KeyCode) -> Option<&'static str> {
    KEY_TABLE
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdmx_core::{ABORT_KEY, CONTINUE_KEY, Layout};

    #[test]
    fn every_response_key_is_reachable() {
        let layout = Layout::standard(250.0).unwrap();
        for id in layout.allowed_identifiers() {
            assert!(
                KEY_TABLE.iter().any(|(_, k)| *k == id),
                "{id} has no physical key"
            );
        }
        assert_eq!(key_identifier(KeyCode::Escape), Some(ABORT_KEY));
        assert_eq!(key_identifier(KeyCode::Space), Some(CONTINUE_KEY));
    }

    #[test]
    fn numpad_and_number_row_stay_distinct() {
        assert_eq!(key_identifier(KeyCode::Numpad6), Some("num_6"));
        assert_eq!(key_identifier(KeyCode::Digit6), Some("6"));
        assert_eq!(key_identifier(KeyCode::F1), None);
    }
}
