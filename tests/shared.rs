mod support;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use netpanel::backend::mock::{BackendCall, MockBackend};
use netpanel::{
    ManagerSignal, MemorySettingsStore, NetworkEntry, PanelIntent, SecurityType, SharedController,
};
use support::{ScriptedPrompter, panel, ssid};

type Shared = SharedController<MockBackend, MemorySettingsStore, ScriptedPrompter>;

fn office() -> NetworkEntry {
    NetworkEntry::new("office", 60, SecurityType::Wpa)
}

fn cafe() -> NetworkEntry {
    NetworkEntry::new("cafe", 40, SecurityType::Open)
}

#[test]
fn hiding_during_a_prompt_stops_scanning_afterwards() {
    let slot: Rc<RefCell<Weak<Shared>>> = Rc::default();
    let applied_immediately = Rc::new(Cell::new(None));
    let prompter = ScriptedPrompter::new().answer(Some("12345678")).on_open({
        let slot = slot.clone();
        let applied_immediately = applied_immediately.clone();
        move || {
            if let Some(shared) = slot.borrow().upgrade() {
                applied_immediately.set(Some(shared.set_visible(false)));
            }
        }
    });
    let shared = Rc::new(SharedController::new(panel(vec![office()], &[], prompter)));
    *slot.borrow_mut() = Rc::downgrade(&shared);

    assert!(shared.dispatch(PanelIntent::Connect(ssid("office"))));

    assert_eq!(applied_immediately.get(), Some(false));
    assert!(!shared.has_pending_visibility());
    let controller = shared.try_borrow().unwrap();
    assert!(!controller.is_active());
    assert!(!controller.manager().is_scanning());
    assert_eq!(
        controller.manager().calls(),
        vec![
            BackendCall::Connect {
                ssid: ssid("office"),
                passphrase: Some("12345678".to_string())
            },
            BackendCall::Stop,
        ]
    );
}

#[test]
fn pump_applies_a_deferred_hide() {
    let shared = SharedController::new(panel(vec![cafe()], &[], ScriptedPrompter::new()));

    {
        let _rendering = shared.try_borrow().unwrap();
        assert!(!shared.set_visible(false));
    }
    assert!(shared.has_pending_visibility());
    assert!(shared.try_borrow().unwrap().manager().is_scanning());

    assert!(shared.pump());

    let controller = shared.try_borrow().unwrap();
    assert!(!controller.is_active());
    assert!(!controller.manager().is_scanning());
}

#[test]
fn latest_visibility_request_wins() {
    let shared = SharedController::new(panel(vec![cafe()], &[], ScriptedPrompter::new()));

    {
        let _rendering = shared.try_borrow().unwrap();
        shared.set_visible(false);
        shared.set_visible(true);
    }
    shared.pump();

    let controller = shared.try_borrow().unwrap();
    assert!(controller.is_active());
    assert_eq!(controller.manager().calls(), vec![BackendCall::Start]);
}

#[test]
fn input_is_dropped_while_busy() {
    let shared = SharedController::new(panel(vec![cafe()], &[], ScriptedPrompter::new()));

    {
        let _rendering = shared.try_borrow().unwrap();
        assert!(!shared.dispatch(PanelIntent::Connect(ssid("cafe"))));
    }

    assert!(shared.try_borrow().unwrap().manager().calls().is_empty());
}

#[test]
fn pump_reports_processed_signals() {
    let shared = SharedController::new(panel(vec![cafe()], &[], ScriptedPrompter::new()));
    assert!(!shared.pump());

    shared
        .try_borrow()
        .unwrap()
        .manager()
        .emit(ManagerSignal::Refresh);

    assert!(shared.pump());
    assert!(!shared.pump());
}
