//! End-to-end routing behavior through the public API.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use superschema_events::{
    get_event_dispatcher, DispatchError, ErrorCallback, Event, EventHandler, EventHandlers,
    DEFAULT_HANDLER_KEY,
};

/// Records which named handler saw which event.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<(&'static str, Event)>>>,
    errors: Arc<Mutex<Vec<DispatchError>>>,
}

impl Recorder {
    fn handler(&self, name: &'static str) -> EventHandler {
        let calls = Arc::clone(&self.calls);
        Arc::new(move |_err: &ErrorCallback, event: &Event| {
            calls.lock().unwrap().push((name, event.clone()));
        })
    }

    fn error_callback(&self) -> impl Fn(DispatchError) + Send + Sync + 'static {
        let errors = Arc::clone(&self.errors);
        move |err| errors.lock().unwrap().push(err)
    }

    fn called(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }

    fn errors(&self) -> Vec<DispatchError> {
        self.errors.lock().unwrap().clone()
    }
}

fn event(event_type: &str) -> Value {
    json!({
        "id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
        "type": event_type,
        "metadata": {
            "cid": "a47ac10b-58cc-4372-a567-0e02b2c3d479",
            "pid": "b47ac10b-58cc-4372-a567-0e02b2c3d479",
        },
        "data": { "orderId": 17 },
    })
}

fn order_registry(rec: &Recorder, with_default: bool) -> EventHandlers {
    let mut entries = vec![
        ("Order", rec.handler("h1")),
        ("Order:2", rec.handler("h2")),
    ];
    if with_default {
        entries.push((DEFAULT_HANDLER_KEY, rec.handler("h3")));
    }
    entries.into_iter().collect()
}

#[test]
fn exact_versioned_type_wins() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));

    dispatch.dispatch(&event("Order:2"));

    assert_eq!(rec.called(), vec!["h2"]);
    assert!(rec.errors().is_empty());
}

#[test]
fn unknown_version_falls_back_to_base_type() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));

    dispatch.dispatch(&event("Order:3"));

    assert_eq!(rec.called(), vec!["h1"]);
}

#[test]
fn unknown_type_goes_to_default_handler() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));

    dispatch.dispatch(&event("Shipment"));

    assert_eq!(rec.called(), vec!["h3"]);
}

#[test]
fn unknown_type_without_default_is_dropped_silently() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, false));

    dispatch.dispatch(&event("Shipment"));

    assert!(rec.called().is_empty());
    assert!(rec.errors().is_empty());
}

#[test]
fn invalid_event_reports_schema_mismatch_once() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));

    let mut missing_pid = event("Order");
    missing_pid["metadata"]
        .as_object_mut()
        .unwrap()
        .remove("pid");
    dispatch.dispatch(&missing_pid);

    assert!(rec.called().is_empty());
    let errors = rec.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        serde_json::to_value(&errors[0]).unwrap(),
        json!({
            "error": "SchemaMismatchError",
            "message": "Event does not match event schema",
        })
    );
}

#[test]
fn handler_receives_decoded_event() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, false));

    dispatch.dispatch(&event("Order:2"));

    let calls = rec.calls.lock().unwrap();
    let (_, received) = &calls[0];
    assert_eq!(received.id.to_string(), "f47ac10b-58cc-4372-a567-0e02b2c3d479");
    assert_eq!(received.version(), Some("2"));
    assert_eq!(received.data.as_ref().unwrap()["orderId"], json!(17));
}

#[test]
fn dispatching_twice_invokes_handler_twice_with_equal_events() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));
    let value = event("Order");

    dispatch.dispatch(&value);
    dispatch.dispatch(&value);

    let calls = rec.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
}

#[test]
fn handlers_report_their_own_errors_through_the_callback() {
    let rec = Recorder::default();
    let handlers = EventHandlers::new().on("Payment", |err, event| {
        err(DispatchError::new(
            "PaymentDeclined",
            format!("payment {} declined", event.id),
        ));
    });
    let dispatch = get_event_dispatcher(rec.error_callback(), handlers);

    dispatch.dispatch(&event("Payment:1"));

    let errors = rec.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error, "PaymentDeclined");
}

#[test]
fn dispatcher_can_be_shared_across_threads() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, true));

    std::thread::scope(|s| {
        for _ in 0..4 {
            let dispatch = dispatch.clone();
            s.spawn(move || {
                for ty in ["Order", "Order:2", "Order:7", "Shipment"] {
                    dispatch.dispatch(&event(ty));
                }
            });
        }
    });

    let mut called = rec.called();
    called.sort_unstable();
    assert_eq!(called.len(), 16);
    assert_eq!(called.iter().filter(|n| **n == "h1").count(), 8);
    assert_eq!(called.iter().filter(|n| **n == "h2").count(), 4);
    assert_eq!(called.iter().filter(|n| **n == "h3").count(), 4);
}

#[test]
#[should_panic(expected = "handler failure")]
fn handler_panics_propagate_to_caller() {
    let dispatch = get_event_dispatcher(
        |_| {},
        EventHandlers::new().on("Order", |_, _| panic!("handler failure")),
    );
    dispatch.dispatch(&event("Order"));
}

#[test]
fn handler_receives_event_exactly_as_sent() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handlers = EventHandlers::new().on_default(move |_: &ErrorCallback, event: &Event| {
        sink.lock().unwrap().push(serde_json::to_value(event).unwrap());
    });
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), handlers);

    let sent = json!({
        "id": "F47AC10B-58CC-4372-A567-0E02B2C3D479",
        "type": "Order",
        "timestamp": 1_700_000_000,
        "metadata": {
            "cid": "A47AC10B-58CC-4372-A567-0E02B2C3D479",
            "pid": "b47ac10b-58cc-4372-a567-0e02b2c3d479",
            "traceparent": "00-ab",
        },
        "data": { "orderId": 17 },
    });
    dispatch.dispatch(&sent);

    assert!(rec.errors().is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![sent]);
}

#[test]
fn typed_dispatch_keeps_unknown_fields() {
    let rec = Recorder::default();
    let dispatch = get_event_dispatcher(rec.error_callback(), order_registry(&rec, false));

    let mut typed = Event::try_from(&event("Order")).unwrap();
    typed.extra.insert("source".into(), json!("billing"));
    dispatch.dispatch_event(&typed);

    let calls = rec.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, typed);
    assert_eq!(calls[0].1.extra["source"], json!("billing"));
}
