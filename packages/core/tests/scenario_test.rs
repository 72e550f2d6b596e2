//! End-to-end routing scenario driven purely through `RelayState`,
//! without a live transport.

use relay_core::{Action, ConnectionId, Event, FixedClock, MessageIntent, Outbound, RelayState};

fn relay() -> RelayState {
    RelayState::with_clock(Box::new(FixedClock::new(1_700_000_000_000)))
}

fn connect_named(relay: &mut RelayState, name: &str) -> ConnectionId {
    let id = ConnectionId::new();
    relay.connect(id).expect("fresh ids never collide");
    relay
        .apply(
            id,
            Action::SetUsername {
                name: name.to_string(),
            },
        )
        .expect("valid name");
    id
}

fn join(relay: &mut RelayState, id: ConnectionId, room: &str) {
    relay
        .apply(
            id,
            Action::JoinRoom {
                room: room.to_string(),
            },
        )
        .expect("valid room");
}

fn send(relay: &mut RelayState, id: ConnectionId, body: &str, to: Option<&str>, room: Option<&str>) -> Vec<Outbound> {
    relay
        .apply(
            id,
            Action::SendMessage(MessageIntent {
                body: body.to_string(),
                to: to.map(String::from),
                room: room.map(String::from),
            }),
        )
        .expect("routable message")
}

fn message_recipients(out: &[Outbound]) -> Vec<ConnectionId> {
    out.iter()
        .find(|outbound| matches!(outbound.event, Event::ReceiveMessage(_)))
        .map(|outbound| outbound.recipients.clone())
        .unwrap_or_default()
}

fn online_users(out: &[Outbound]) -> Vec<String> {
    out.iter()
        .find_map(|outbound| match &outbound.event {
            Event::OnlineUsers(users) => Some(users.clone()),
            _ => None,
        })
        .expect("presence snapshot present")
}

#[test]
fn test_three_user_room_and_private_scenario() {
    // given: alice, bob and carol are connected and named
    let mut relay = relay();
    let alice = connect_named(&mut relay, "alice");
    let bob = connect_named(&mut relay, "bob");
    let carol = connect_named(&mut relay, "carol");

    // and: alice and bob share room "dev"
    join(&mut relay, alice, "dev");
    join(&mut relay, bob, "dev");

    // when: alice sends to room "dev"
    let out = send(&mut relay, alice, "hi", None, Some("dev"));

    // then: delivered to alice and bob only, not carol
    let recipients = message_recipients(&out);
    assert_eq!(recipients.len(), 2);
    assert!(recipients.contains(&alice));
    assert!(recipients.contains(&bob));
    assert!(!recipients.contains(&carol));

    // when: carol whispers to bob
    let out = send(&mut relay, carol, "psst", Some("bob"), None);

    // then: delivered to bob and carol
    let recipients = message_recipients(&out);
    assert_eq!(recipients.len(), 2);
    assert!(recipients.contains(&bob));
    assert!(recipients.contains(&carol));

    // when: bob disconnects
    let out = relay.disconnect(bob);

    // then: presence is alice and carol, no stale entries
    assert_eq!(
        online_users(&out),
        vec!["alice".to_string(), "carol".to_string()]
    );

    // when: alice sends to room "dev" again
    let out = send(&mut relay, alice, "still here?", None, Some("dev"));

    // then: delivered to alice only, bob's membership is gone
    assert_eq!(message_recipients(&out), vec![alice]);
}

#[test]
fn test_public_message_reaches_everyone_registered() {
    // given:
    let mut relay = relay();
    let alice = connect_named(&mut relay, "alice");
    let bob = connect_named(&mut relay, "bob");
    let carol = connect_named(&mut relay, "carol");
    relay.disconnect(carol);

    // when: alice sends with no discriminator
    let out = send(&mut relay, alice, "hello all", None, None);

    // then: everyone currently registered, nobody else
    let recipients = message_recipients(&out);
    assert_eq!(recipients.len(), 2);
    assert!(recipients.contains(&alice));
    assert!(recipients.contains(&bob));
    assert!(!recipients.contains(&carol));
}
