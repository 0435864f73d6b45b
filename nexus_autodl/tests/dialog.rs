use {
    nexus_autodl::{detector::Detection, ButtonRole, Rect, ScanMode, ScanState, TemplateId},
    std::time::Instant,
};

fn det(id: u16, role: ButtonRole, match_count: usize) -> Detection {
    Detection {
        template_id: TemplateId::from(id),
        role,
        bounds: Rect::from_xywh(0, 0, 40, 20),
        match_count,
    }
}

#[test]
fn nothing_selected_from_empty_detections() {
    let state = ScanState::new();
    assert_eq!(state.select_action(&[]), None);
}

#[test]
fn single_step_roles_click_and_stay_idle() {
    let mut state = ScanState::new();
    for role in [
        ButtonRole::WebsiteDownload,
        ButtonRole::WabbajackDownload,
        ButtonRole::VortexDownload,
    ] {
        let detections = [det(0, role, 20)];
        assert_eq!(state.select_action(&detections), Some(0));
        state.commit(role, Instant::now());
        assert_eq!(state.mode(), ScanMode::Idle);
    }
    assert_eq!(state.clicks(), 3);
    assert!(state.last_action_at().is_some());
}

#[test]
fn staging_opens_the_dialog() {
    let mut state = ScanState::new();
    let detections = [det(0, ButtonRole::VortexStaging, 15)];
    assert_eq!(state.select_action(&detections), Some(0));
    state.commit(ButtonRole::VortexStaging, Instant::now());
    assert_eq!(
        state.mode(),
        ScanMode::AwaitingSecondStep(ButtonRole::VortexStaging)
    );
}

#[test]
fn follow_up_resolves_the_dialog() {
    let mut state = ScanState::new();
    state.commit(ButtonRole::VortexStaging, Instant::now());

    // Only the follow-up is actionable, whatever else is on screen.
    let detections = [
        det(0, ButtonRole::WebsiteDownload, 50),
        det(1, ButtonRole::VortexUnderstood, 10),
    ];
    assert_eq!(state.select_action(&detections), Some(1));
    state.commit(ButtonRole::VortexUnderstood, Instant::now());
    assert_eq!(state.mode(), ScanMode::Idle);
    assert_eq!(state.clicks(), 2);
}

#[test]
fn understood_is_ignored_while_idle() {
    let state = ScanState::new();
    let detections = [det(0, ButtonRole::VortexUnderstood, 40)];
    assert_eq!(state.select_action(&detections), None);
}

#[test]
fn downloads_are_ignored_while_awaiting_follow_up() {
    let mut state = ScanState::new();
    state.commit(ButtonRole::VortexStaging, Instant::now());
    let detections = [
        det(0, ButtonRole::WebsiteDownload, 50),
        det(1, ButtonRole::VortexStaging, 30),
    ];
    assert_eq!(state.select_action(&detections), None);
}

#[test]
fn higher_confidence_wins() {
    let state = ScanState::new();
    let detections = [
        det(0, ButtonRole::WebsiteDownload, 10),
        det(1, ButtonRole::WabbajackDownload, 25),
    ];
    assert_eq!(state.select_action(&detections), Some(1));
}

#[test]
fn dialog_steps_outrank_downloads_on_confidence_ties() {
    let state = ScanState::new();
    let detections = [
        det(0, ButtonRole::WebsiteDownload, 20),
        det(5, ButtonRole::VortexStaging, 20),
    ];
    assert_eq!(state.select_action(&detections), Some(1));
}

#[test]
fn template_id_breaks_remaining_ties() {
    let state = ScanState::new();
    let detections = [
        det(7, ButtonRole::WebsiteDownload, 20),
        det(3, ButtonRole::WebsiteDownload, 20),
    ];
    assert_eq!(state.select_action(&detections), Some(1));
}
