//! UDP sink: one JSON datagram per command.
//!
//! Frames are shaped like a `geometry_msgs/Twist` so a bridge on the robot
//! side can forward them to `cmd_vel` without reshaping:
//!
//! ```json
//! {"topic":"cmd_vel","seq":0,"stamp":"2026-01-01T00:00:00+00:00",
//!  "linear":{"x":1.0,"y":0.0,"z":0.0},"angular":{"x":0.0,"y":0.0,"z":0.0}}
//! ```

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

use super::{CommandSink, SinkError};
use crate::core::state::VelocityCommand;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9870";
pub const DEFAULT_BIND: &str = "0.0.0.0:0";
pub const DEFAULT_TOPIC: &str = "cmd_vel";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TwistFrame {
    pub topic: String,
    pub seq: u64,
    pub stamp: String,
    pub linear: Vector3,
    pub angular: Vector3,
}

impl TwistFrame {
    pub fn new(topic: &str, seq: u64, command: &VelocityCommand) -> Self {
        Self {
            topic: topic.to_string(),
            seq,
            stamp: Utc::now().to_rfc3339(),
            linear: Vector3 { x: command.linear, ..Default::default() },
            angular: Vector3 { z: command.angular, ..Default::default() },
        }
    }
}

pub struct UdpSink {
    socket: Option<UdpSocket>,
    topic: String,
    seq: u64,
}

impl UdpSink {
    /// Binds a local socket and fixes the destination.
    pub async fn connect(bind: &str, address: &str, topic: &str) -> Result<Self, SinkError> {
        let socket = UdpSocket::bind(bind).await?;
        socket.connect(address).await?;
        info!(
            "UDP sink {} -> {} (topic {})",
            socket.local_addr()?,
            address,
            topic
        );
        Ok(Self {
            socket: Some(socket),
            topic: topic.to_string(),
            seq: 0,
        })
    }
}

#[async_trait]
impl CommandSink for UdpSink {
    fn name(&self) -> &str {
        "udp"
    }

    async fn send(&mut self, command: &VelocityCommand) -> Result<(), SinkError> {
        let socket = self.socket.as_ref().ok_or(SinkError::Closed)?;
        let frame = TwistFrame::new(&self.topic, self.seq, command);
        let bytes = serde_json::to_vec(&frame).map_err(SinkError::Encode)?;
        socket.send(&bytes).await?;
        debug!("sent frame seq={} ({} bytes)", self.seq, bytes.len());
        self.seq += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.socket.take().is_some() {
            info!("UDP sink closed after {} frames", self.seq);
        }
        Ok(())
    }
}
