//! Property-based tests for the message model.

use crate::message::{Message, Method};
use crate::uri::Uri;
use proptest::prelude::*;

fn user() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}".prop_map(|s| s)
}

fn domain() -> impl Strategy<Value = String> {
    "[a-z]{2,8}\\.[a-z]{2,8}\\.net".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Render/parse round-trip for requests built from the typed model.
    #[test]
    fn prop_request_round_trip(
        caller in user(),
        callee in user(),
        dom in domain(),
        call_id in "[a-z0-9-]{4,20}",
        hops in 1u32..70,
    ) {
        let mut msg = Message::request(Method::Invite, Uri::new(callee.clone(), dom.clone()));
        msg.from = crate::NameAddr {
            display: None,
            uri: Uri::new(caller, dom.clone()),
            params: ";tag=1".to_string(),
        };
        msg.to = crate::NameAddr {
            display: None,
            uri: Uri::new(callee, dom),
            params: String::new(),
        };
        msg.call_id = call_id;
        msg.cseq = "1 INVITE".to_string();
        msg.max_forwards = hops;
        prop_assert_eq!(Message::parse(&msg.to_string()).unwrap(), msg);
    }

    // The Via stack behaves like a stack across arbitrary entries.
    #[test]
    fn prop_via_push_pop_is_lifo(
        entries in prop::collection::vec("SIP/2\\.0/UDP [a-z.]{3,20}:[0-9]{4};branch=z9hG4bK[0-9a-f]{1,12}", 1..6),
    ) {
        let mut msg = Message::request(Method::Register, Uri::new("", "h.net"));
        for entry in &entries {
            msg.push_via(entry.clone());
        }
        for entry in entries.iter().rev() {
            let popped = msg.pop_via();
            prop_assert_eq!(popped.as_deref(), Some(entry.as_str()));
        }
        prop_assert!(msg.pop_via().is_none());
    }

    // URI display/parse round-trip for user@domain shapes.
    #[test]
    fn prop_uri_round_trip(u in user(), d in domain()) {
        let uri = Uri::new(u, d);
        prop_assert_eq!(Uri::parse(&uri.to_string()).unwrap(), uri);
    }
}
