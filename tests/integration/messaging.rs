use crate::*;

use std::sync::{Arc, Mutex};

use courier_exchange::http::{self, HttpFuture};
use courier_exchange::{dispatch, ExchangeTask, Timed, TracingObserver};
use courier_messaging::events::{self, CONFIG_EVENT, STATUS_EVENT};
use courier_messaging::message::{channel, CONTENT_TYPE_ANY};
use courier_messaging::{
    config_content, new_config_message, reply, status_content, Message, MessageError, Receiver,
};
use reqwest::Request;

type ExchangeFn = Arc<dyn Fn(Arc<Timed<Request>>) -> HttpFuture + Send + Sync>;

/// Collects whatever is delivered to it.
#[derive(Default)]
struct Inbox {
    received: Mutex<Vec<Message>>,
}

impl Receiver for Inbox {
    fn receive(&self, msg: Message) {
        self.received.lock().unwrap().push(msg);
    }
}

/// A worker that acknowledges every control message addressed to it.
struct Worker {
    name: &'static str,
}

impl Worker {
    fn handle(&self, msg: &Message) -> Result<(), MessageError> {
        let code = if msg.is_recipient(self.name) { 200 } else { 404 };
        reply(msg, code, self.name)
    }
}

#[test]
fn worker_acknowledges_shared_startup() -> Result<()> {
    let supervisor = Arc::new(Inbox::default());
    let worker = Worker { name: "test:agent/worker" };

    let mut startup = events::STARTUP.clone();
    startup
        .add_recipient(worker.name)
        .set_sender("test:agent/supervisor")
        .set_reply_recipient(supervisor.clone());
    worker.handle(&startup)?;

    let mut stray = events::STARTUP.clone();
    stray.add_recipient("test:agent/other");
    stray.set_reply_recipient(supervisor.clone());
    worker.handle(&stray)?;

    let received = supervisor.received.lock().unwrap();
    assert_eq!(received.len(), 2);
    for status in received.iter() {
        assert_eq!(status.name(), STATUS_EVENT);
        assert_eq!(status.channel(), channel::CONTROL);
        assert_eq!(status.sender(), "test:agent/worker");
    }
    assert_eq!(status_content(&received[0])?, (200, events::STARTUP_EVENT.to_string()));
    assert_eq!(status_content(&received[1])?.0, 404);

    // The shared message itself was never touched.
    assert!(events::STARTUP.recipients().is_empty());
    assert!(events::STARTUP.reply_target().is_none());
    Ok(())
}

#[test]
fn misbound_reply_target_surfaces_on_reply() {
    let worker = Worker { name: "test:agent/worker" };
    let mut msg = events::SHUTDOWN.clone();
    msg.add_recipient(worker.name);
    msg.set_reply_any(String::from("not a receiver"));

    assert!(matches!(
        worker.handle(&msg),
        Err(MessageError::InvalidReplyTarget(_))
    ));
}

/// An exchange function is shipped in a config message and then used to run
/// a batch.
#[tokio::test]
async fn config_message_delivers_exchange_function() -> Result<()> {
    let addr = spawn_server().await?;
    let client = client();

    let exchange = http::exchange(client.clone());
    let ex: ExchangeFn = Arc::new(move |req| exchange(req));
    let config = new_config_message(ex);
    assert_eq!(config.name(), CONFIG_EVENT);
    assert_eq!(config.content_type(), CONTENT_TYPE_ANY);

    // Opaque values cannot be read as data.
    assert!(config.read_content::<String>().is_err());

    let received: ExchangeFn = config_content(&config).context("exchange function")?;
    let tasks = vec![ExchangeTask::new("json", Timed::new(get(&client, addr, "/json")))];
    let store = dispatch(move |req| received(req), TracingObserver, tasks).await;

    let result = store.get("json").context("json result")?;
    let resp = result.response().context("json response")?;
    assert_eq!(resp.content().read::<serde_json::Value>()?, serde_json::json!({"x": 1}));
    Ok(())
}
