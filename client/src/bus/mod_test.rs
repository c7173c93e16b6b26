use super::*;

// =============================================================
// Helpers
// =============================================================

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, tag: &'static str) -> Handler<AppEvent> {
    let log = Rc::clone(log);
    handler(move |event: &AppEvent| {
        let AppEvent::CharacterUnlocked { character_id } = event else {
            return Err("unexpected event".into());
        };
        log.borrow_mut().push(format!("{tag}:{character_id}"));
        Ok(())
    })
}

fn unlocked(id: &str) -> AppEvent {
    AppEvent::CharacterUnlocked { character_id: id.to_owned() }
}

const KIND: AppEventKind = AppEventKind::CharacterUnlocked;

// =============================================================
// Ordering + delivery
// =============================================================

#[test]
fn publish_invokes_handlers_in_subscription_order() {
    let bus = EventBus::new();
    let log = Log::default();
    bus.subscribe(KIND, recorder(&log, "f1"));
    bus.subscribe(KIND, recorder(&log, "f2"));
    bus.subscribe(KIND, recorder(&log, "f3"));

    let report = bus.publish(&unlocked("dog"));

    assert_eq!(*log.borrow(), ["f1:dog", "f2:dog", "f3:dog"]);
    assert_eq!(report, DispatchReport { delivered: 3, failed: 0 });
}

#[test]
fn publish_only_reaches_matching_kind() {
    let bus = EventBus::new();
    let log = Log::default();
    bus.subscribe(KIND, recorder(&log, "f1"));

    let report = bus.publish(&AppEvent::RoomJoined { room_id: "R1".to_owned() });

    assert!(log.borrow().is_empty());
    assert_eq!(report.delivered, 0);
}

#[test]
fn publish_without_subscribers_is_noop() {
    let bus: EventBus<AppEvent> = EventBus::new();
    let report = bus.publish(&unlocked("dog"));
    assert_eq!(report, DispatchReport::default());
    assert!(!bus.has_topic(KIND));
}

#[test]
fn duplicate_registration_fires_twice() {
    let bus = EventBus::new();
    let log = Log::default();
    let f = recorder(&log, "f");
    bus.subscribe(KIND, Rc::clone(&f));
    bus.subscribe(KIND, Rc::clone(&f));

    bus.publish(&unlocked("cat"));

    assert_eq!(log.borrow().len(), 2);
}

// =============================================================
// Unsubscribe
// =============================================================

#[test]
fn unsubscribe_removes_only_that_handler() {
    let bus = EventBus::new();
    let log = Log::default();
    let f2 = recorder(&log, "f2");
    bus.subscribe(KIND, recorder(&log, "f1"));
    bus.subscribe(KIND, Rc::clone(&f2));
    bus.subscribe(KIND, recorder(&log, "f3"));

    bus.unsubscribe(KIND, &f2);
    bus.publish(&unlocked("duck"));

    assert_eq!(*log.borrow(), ["f1:duck", "f3:duck"]);
}

#[test]
fn unsubscribe_removes_every_duplicate() {
    let bus = EventBus::new();
    let log = Log::default();
    let f = recorder(&log, "f");
    bus.subscribe(KIND, Rc::clone(&f));
    bus.subscribe(KIND, Rc::clone(&f));

    bus.unsubscribe(KIND, &f);

    assert_eq!(bus.subscriber_count(KIND), 0);
}

#[test]
fn unsubscribe_last_keeps_empty_topic() {
    let bus = EventBus::new();
    let f = recorder(&Log::default(), "f");
    bus.subscribe(KIND, Rc::clone(&f));

    bus.unsubscribe(KIND, &f);

    assert!(bus.has_topic(KIND));
    assert_eq!(bus.subscriber_count(KIND), 0);
    assert_eq!(bus.publish(&unlocked("cat")), DispatchReport::default());
}

#[test]
fn unsubscribe_unknown_is_noop() {
    let bus: EventBus<AppEvent> = EventBus::new();
    let f = recorder(&Log::default(), "f");
    bus.unsubscribe(KIND, &f);
    assert!(!bus.has_topic(KIND));
}

// =============================================================
// Failure isolation
// =============================================================

#[test]
fn failing_handler_does_not_block_later_handlers() {
    let bus = EventBus::new();
    let log = Log::default();
    bus.subscribe(KIND, recorder(&log, "f1"));
    bus.subscribe(KIND, handler(|_: &AppEvent| Err(HandlerError::new("boom"))));
    bus.subscribe(KIND, recorder(&log, "f3"));

    let report = bus.publish(&unlocked("wolf"));

    assert_eq!(*log.borrow(), ["f1:wolf", "f3:wolf"]);
    assert_eq!(report, DispatchReport { delivered: 2, failed: 1 });
    assert!(!report.is_clean());
}

// =============================================================
// Reentrancy
// =============================================================

#[test]
fn handler_can_publish_reentrantly() {
    let bus = Rc::new(EventBus::new());
    let log = Log::default();

    let inner_log = Rc::clone(&log);
    let inner_bus = Rc::downgrade(&bus);
    bus.subscribe(
        KIND,
        handler(move |event: &AppEvent| {
            let AppEvent::CharacterUnlocked { character_id } = event else {
                return Ok(());
            };
            inner_log.borrow_mut().push(character_id.clone());
            if character_id == "cat" {
                if let Some(bus) = inner_bus.upgrade() {
                    bus.publish(&unlocked("dog"));
                }
            }
            Ok(())
        }),
    );

    bus.publish(&unlocked("cat"));

    assert_eq!(*log.borrow(), ["cat", "dog"]);
}

#[test]
fn handler_subscribed_during_dispatch_runs_next_time() {
    let bus = Rc::new(EventBus::new());
    let log = Log::default();

    let weak = Rc::downgrade(&bus);
    let late = recorder(&log, "late");
    bus.subscribe(
        KIND,
        handler(move |_: &AppEvent| {
            if let Some(bus) = weak.upgrade() {
                bus.subscribe(KIND, Rc::clone(&late));
            }
            Ok(())
        }),
    );

    bus.publish(&unlocked("cat"));
    assert!(log.borrow().is_empty());

    bus.publish(&unlocked("dog"));
    assert_eq!(*log.borrow(), ["late:dog"]);
}

#[test]
fn debug_lists_subscriber_counts() {
    let bus = EventBus::new();
    bus.subscribe(KIND, recorder(&Log::default(), "f"));
    assert_eq!(format!("{bus:?}"), "{CharacterUnlocked: 1}");
}
