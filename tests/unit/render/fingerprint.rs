use super::*;
use crate::timeline::state::Caret;

fn base() -> RenderState {
    RenderState {
        question_chars: 4,
        code_chars: 0,
        command_chars: 0,
        terminal_y: None,
        output_visible: false,
        caret: Some(Caret {
            target: TypingTarget::Question,
            visible: true,
        }),
    }
}

#[test]
fn equal_states_match() {
    assert_eq!(fingerprint_state(&base()), fingerprint_state(&base()));
}

#[test]
fn every_visible_field_changes_the_fingerprint() {
    let a = fingerprint_state(&base());
    let variants = [
        RenderState {
            question_chars: 5,
            ..base()
        },
        RenderState {
            code_chars: 1,
            ..base()
        },
        RenderState {
            terminal_y: Some(0),
            ..base()
        },
        RenderState {
            output_visible: true,
            ..base()
        },
        RenderState {
            caret: None,
            ..base()
        },
        RenderState {
            caret: Some(Caret {
                target: TypingTarget::Code,
                visible: true,
            }),
            ..base()
        },
    ];
    for v in variants {
        assert_ne!(fingerprint_state(&v), a, "{v:?}");
    }
}

#[test]
fn hidden_caret_matches_no_caret() {
    let hidden = RenderState {
        caret: Some(Caret {
            target: TypingTarget::Code,
            visible: false,
        }),
        ..base()
    };
    let none = RenderState {
        caret: None,
        ..base()
    };
    assert_eq!(fingerprint_state(&hidden), fingerprint_state(&none));
}
