// AMQP 0-9-1 implementation of the broker seam, via lapin.
//
// Each session dials its own connection, opens one channel, declares a
// server-named exclusive auto-delete reply queue and consumes it with
// auto-ack. Closing the connection drops the queue on the broker side.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use tracing::debug;

use super::error::{ClassifierError, TransportStage};
use super::protocol::CONTENT_TYPE_JSON;
use super::transport::{Broker, InboundReply, OutboundRequest, ReplySession};

/// AMQP delivery mode 2: the broker persists the message.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

const REPLY_SUCCESS: u16 = 200;

/// Requests go through the default exchange, routed by queue name.
const DEFAULT_EXCHANGE: &str = "";

/// Broker reached over AMQP at a fixed URL.
pub struct AmqpBroker {
    url: String,
}

impl AmqpBroker {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Broker for AmqpBroker {
    async fn open_session(&self) -> Result<Box<dyn ReplySession>, ClassifierError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default())
            .await
            .map_err(|e| ClassifierError::transport(TransportStage::Connect, e))?;

        match open_reply_channel(&connection).await {
            Ok((channel, reply_queue, consumer)) => {
                debug!(reply_queue = %reply_queue, "Opened AMQP reply session");
                Ok(Box::new(AmqpSession {
                    connection,
                    channel,
                    consumer,
                    reply_queue,
                }))
            }
            Err(e) => {
                if let Err(close_err) = connection.close(REPLY_SUCCESS, "setup failed").await {
                    debug!(error = %close_err, "Failed to close AMQP connection after setup error");
                }
                Err(e)
            }
        }
    }
}

async fn open_reply_channel(
    connection: &Connection,
) -> Result<(Channel, String, Consumer), ClassifierError> {
    let channel = connection
        .create_channel()
        .await
        .map_err(|e| ClassifierError::transport(TransportStage::OpenChannel, e))?;

    let queue = channel
        .queue_declare("", reply_queue_options(), FieldTable::default())
        .await
        .map_err(|e| ClassifierError::transport(TransportStage::DeclareQueue, e))?;
    let reply_queue = queue.name().as_str().to_string();

    let consumer = channel
        .basic_consume(
            &reply_queue,
            "",
            reply_consume_options(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| ClassifierError::transport(TransportStage::RegisterConsumer, e))?;

    Ok((channel, reply_queue, consumer))
}

/// Private reply queue: server-named, gone with the connection.
fn reply_queue_options() -> QueueDeclareOptions {
    QueueDeclareOptions {
        durable: false,
        exclusive: true,
        auto_delete: true,
        ..QueueDeclareOptions::default()
    }
}

fn reply_consume_options() -> BasicConsumeOptions {
    BasicConsumeOptions {
        no_ack: true,
        ..BasicConsumeOptions::default()
    }
}

fn request_properties(request: &OutboundRequest) -> BasicProperties {
    BasicProperties::default()
        .with_content_type(CONTENT_TYPE_JSON.into())
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
        .with_correlation_id(request.correlation_id.as_str().into())
        .with_reply_to(request.reply_to.as_str().into())
}

struct AmqpSession {
    connection: Connection,
    channel: Channel,
    consumer: Consumer,
    reply_queue: String,
}

#[async_trait]
impl ReplySession for AmqpSession {
    fn reply_queue(&self) -> &str {
        &self.reply_queue
    }

    async fn publish(
        &mut self,
        work_queue: &str,
        request: OutboundRequest,
    ) -> Result<(), ClassifierError> {
        let properties = request_properties(&request);

        self.channel
            .basic_publish(
                DEFAULT_EXCHANGE,
                work_queue,
                BasicPublishOptions::default(),
                &request.body,
                properties,
            )
            .await
            .map_err(|e| ClassifierError::transport(TransportStage::Publish, e))?
            .await
            .map_err(|e| ClassifierError::transport(TransportStage::Publish, e))?;

        Ok(())
    }

    async fn next_reply(&mut self) -> Option<Result<InboundReply, ClassifierError>> {
        let delivery = self.consumer.next().await?;
        Some(
            delivery
                .map(|d| InboundReply {
                    correlation_id: d
                        .properties
                        .correlation_id()
                        .as_ref()
                        .map(|id| id.as_str().to_string()),
                    body: d.data,
                })
                .map_err(|e| ClassifierError::transport(TransportStage::ReceiveReply, e)),
        )
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.channel.close(REPLY_SUCCESS, "done").await {
            debug!(error = %e, "Failed to close AMQP channel");
        }
        if let Err(e) = self.connection.close(REPLY_SUCCESS, "done").await {
            debug!(error = %e, "Failed to close AMQP connection");
        }
    }
}
