//! Routes a check's findings to broadcasts, direct messages, or the console.

use super::mapping::{ChatHandle, PrincipalChatMap};
use super::message::{self, BotIdentity};
use crate::error::{BotError, Result};
use crate::findings::FindingSet;
use crate::transport::{ChatTransport, ConsoleSink};
use tracing::{debug, info};

/// Where one check's results go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRoute {
    /// Broadcast channel. Only optional when chat delivery is disabled.
    pub channel: Option<String>,
    /// Message offending principals directly.
    pub nag: bool,
}

impl CheckRoute {
    pub fn new(channel: Option<String>, nag: bool) -> Self {
        Self { channel, nag }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Broadcast { channel: Option<String> },
    Direct { handle: String },
}

impl Destination {
    /// Address understood by the chat service.
    pub fn address(&self) -> Option<String> {
        match self {
            Destination::Broadcast { channel } => channel.clone(),
            Destination::Direct { handle } => Some(format!("@{}", handle)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: Destination,
    pub text: String,
}

/// How computed messages leave the process.
pub enum Delivery<'a> {
    Chat(&'a dyn ChatTransport),
    Console(&'a mut dyn ConsoleSink),
}

/// Counts of what one dispatch produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub broadcasts: usize,
    pub direct: usize,
    pub unmapped: usize,
    pub suppressed: usize,
}

pub struct Router<'a> {
    delivery: Delivery<'a>,
    identity: BotIdentity,
    /// `None` when the user map could not be loaded; nagging is then a no-op.
    mapping: Option<&'a PrincipalChatMap>,
}

impl<'a> Router<'a> {
    pub fn new(delivery: Delivery<'a>, mapping: Option<&'a PrincipalChatMap>) -> Self {
        Self {
            delivery,
            identity: BotIdentity::default(),
            mapping,
        }
    }

    pub fn with_identity(mut self, identity: BotIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Compute every message for one check without sending anything.
    pub fn plan(&self, set: &FindingSet, route: &CheckRoute) -> (Vec<OutboundMessage>, DispatchReport) {
        let check = set.check();
        let broadcast_to = || Destination::Broadcast {
            channel: route.channel.clone(),
        };
        let mut report = DispatchReport::default();

        if set.is_empty() {
            report.broadcasts = 1;
            return (
                vec![OutboundMessage {
                    destination: broadcast_to(),
                    text: message::all_clear(check),
                }],
                report,
            );
        }

        let mut messages = vec![OutboundMessage {
            destination: broadcast_to(),
            text: message::broadcast(set),
        }];
        report.broadcasts = 1;

        let mapping = match self.mapping {
            Some(mapping) if route.nag => mapping,
            _ => return (messages, report),
        };

        for group in set {
            // Subjects that are not principals have nobody to message.
            let Some(text) = message::direct(check, group, &self.identity) else {
                continue;
            };
            match mapping.resolve(&group.subject) {
                ChatHandle::Mapped(handle) => {
                    debug!(user = %group.subject, handle = %handle, "Messaging user directly");
                    messages.push(OutboundMessage {
                        destination: Destination::Direct { handle },
                        text,
                    });
                    report.direct += 1;
                }
                ChatHandle::Suppressed => {
                    debug!(user = %group.subject, "User is suppressed in the user map");
                    report.suppressed += 1;
                }
                ChatHandle::Unmapped => {
                    debug!(user = %group.subject, "Couldn't find user in the user map");
                    messages.push(OutboundMessage {
                        destination: broadcast_to(),
                        text: message::unmapped(check, &group.subject),
                    });
                    report.unmapped += 1;
                }
            }
        }

        (messages, report)
    }

    /// Deliver a single message. A failed chat post aborts the run.
    pub fn deliver(&mut self, message: &OutboundMessage) -> Result<()> {
        match &mut self.delivery {
            Delivery::Console(sink) => sink.emit(&message.text).map_err(BotError::Console),
            Delivery::Chat(transport) => {
                let address = message.destination.address().ok_or_else(|| {
                    BotError::configuration("no Slack channel configured for this check")
                })?;
                let response = transport.post_message(
                    &address,
                    &self.identity.name,
                    &self.identity.icon,
                    &message.text,
                )?;
                if !response.ok {
                    return Err(BotError::Transport(
                        response.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                debug!(channel = %address, "Posted to Slack");
                Ok(())
            }
        }
    }

    /// Plan and deliver all messages for one check, stopping at the first
    /// failure.
    pub fn dispatch(&mut self, set: &FindingSet, route: &CheckRoute) -> Result<DispatchReport> {
        let (messages, report) = self.plan(set, route);
        for message in &messages {
            self.deliver(message)?;
        }
        info!(
            check = %set.check(),
            broadcasts = report.broadcasts,
            direct = report.direct,
            unmapped = report.unmapped,
            suppressed = report.suppressed,
            "Notifications sent"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::FindingCollector;
    use crate::findings::{CheckKind, Finding};
    use crate::transport::{PostResponse, TransportError};
    use std::cell::RefCell;

    /// Transport recording every post and answering from a script.
    #[derive(Default)]
    struct RecordingTransport {
        posts: RefCell<Vec<(String, String)>>,
        fail_on: Option<usize>,
    }

    impl ChatTransport for RecordingTransport {
        fn post_message(
            &self,
            destination: &str,
            _sender_name: &str,
            _icon: &str,
            text: &str,
        ) -> std::result::Result<PostResponse, TransportError> {
            let mut posts = self.posts.borrow_mut();
            posts.push((destination.to_string(), text.to_string()));
            if self.fail_on == Some(posts.len()) {
                Ok(PostResponse::failed("channel_not_found"))
            } else {
                Ok(PostResponse::ok())
            }
        }
    }

    fn alice_expired() -> FindingSet {
        let mut collector = FindingCollector::new(CheckKind::IamKeys);
        collector.add(Finding::key_expired("alice", "AKIA1"));
        collector.into_set()
    }

    fn route() -> CheckRoute {
        CheckRoute::new(Some("#security".to_string()), true)
    }

    #[test]
    fn test_empty_set_sends_one_all_clear() {
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        let report = router
            .dispatch(&FindingSet::empty(CheckKind::Mfa), &route())
            .unwrap();

        let posts = transport.posts.borrow();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "#security");
        assert_eq!(posts[0].1, message::all_clear(CheckKind::Mfa));
        assert_eq!(report.direct, 0);
    }

    #[test]
    fn test_mapped_subject_gets_direct_message() {
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        router.dispatch(&alice_expired(), &route()).unwrap();

        let posts = transport.posts.borrow();
        let direct: Vec<_> = posts.iter().filter(|(to, _)| to == "@alice.s").collect();
        assert_eq!(direct.len(), 1);
        assert!(direct[0].1.contains("AKIA1"));
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn test_suppressed_subject_is_skipped() {
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new().with_suppressed("alice");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        let report = router.dispatch(&alice_expired(), &route()).unwrap();

        let posts = transport.posts.borrow();
        assert_eq!(posts.len(), 1, "only the broadcast");
        assert!(!posts[0].1.contains("Couldn't find"));
        assert_eq!(report.suppressed, 1);
    }

    #[test]
    fn test_unmapped_subject_gets_fallback_broadcast() {
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new().with_handle("bob", "bob");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        let report = router.dispatch(&alice_expired(), &route()).unwrap();

        let posts = transport.posts.borrow();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].0, "#security");
        assert!(posts[1].1.contains("`alice`"));
        assert_eq!(report.unmapped, 1);
        assert_eq!(report.direct, 0);
    }

    #[test]
    fn test_nag_disabled_sends_only_broadcast() {
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        router
            .dispatch(&alice_expired(), &CheckRoute::new(Some("#security".into()), false))
            .unwrap();
        assert_eq!(transport.posts.borrow().len(), 1);
    }

    #[test]
    fn test_missing_mapping_makes_nag_a_no_op() {
        let transport = RecordingTransport::default();
        let mut router = Router::new(Delivery::Chat(&transport), None);

        let report = router.dispatch(&alice_expired(), &route()).unwrap();
        assert_eq!(transport.posts.borrow().len(), 1);
        assert_eq!(report.unmapped, 0);
    }

    #[test]
    fn test_buckets_are_never_nagged() {
        let mut collector = FindingCollector::new(CheckKind::PublicS3);
        collector.add(Finding::public_bucket("website", vec!["READ".into()]));
        let transport = RecordingTransport::default();
        let mapping = PrincipalChatMap::new();
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        let report = router.dispatch(&collector.into_set(), &route()).unwrap();
        assert_eq!(transport.posts.borrow().len(), 1);
        assert_eq!(report.unmapped, 0);
    }

    #[test]
    fn test_console_delivery_prints_every_message_verbatim() {
        let mut console: Vec<String> = Vec::new();
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut scratch: Vec<String> = Vec::new();
        let expected = Router::new(Delivery::Console(&mut scratch), Some(&mapping))
            .plan(&alice_expired(), &CheckRoute::new(None, true))
            .0;

        let mut router = Router::new(Delivery::Console(&mut console), Some(&mapping));
        router
            .dispatch(&alice_expired(), &CheckRoute::new(None, true))
            .unwrap();

        let texts: Vec<_> = expected.into_iter().map(|m| m.text).collect();
        assert_eq!(console, texts);
        assert_eq!(console.len(), 2);
    }

    #[test]
    fn test_failed_post_aborts_remaining_messages() {
        let transport = RecordingTransport {
            fail_on: Some(1),
            ..Default::default()
        };
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        let err = router.dispatch(&alice_expired(), &route()).unwrap_err();
        assert!(matches!(err, BotError::Transport(ref e) if e == "channel_not_found"));
        assert_eq!(transport.posts.borrow().len(), 1, "direct message never sent");
    }

    #[test]
    fn test_failed_direct_message_is_fatal() {
        let transport = RecordingTransport {
            fail_on: Some(2),
            ..Default::default()
        };
        let mapping = PrincipalChatMap::new().with_handle("alice", "alice.s");
        let mut router = Router::new(Delivery::Chat(&transport), Some(&mapping));

        assert!(router.dispatch(&alice_expired(), &route()).is_err());
    }

    #[test]
    fn test_chat_without_channel_is_a_configuration_error() {
        let transport = RecordingTransport::default();
        let mut router = Router::new(Delivery::Chat(&transport), None);

        let err = router
            .dispatch(&FindingSet::empty(CheckKind::Mfa), &CheckRoute::new(None, false))
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(transport.posts.borrow().is_empty());
    }

    #[test]
    fn test_direct_address_has_at_prefix() {
        let destination = Destination::Direct {
            handle: "alice.s".to_string(),
        };
        assert_eq!(destination.address().as_deref(), Some("@alice.s"));
    }
}
