use std::{
    net::{SocketAddr, UdpSocket},
    str::FromStr,
};

use rosc::{encoder, OscBundle, OscMessage, OscPacket, OscTime, OscType};

use crate::beads::Bead;
use crate::mainloop::FrameSink;

pub const DEFAULT_PORT: u16 = 5005;

const IMMEDIATELY: OscTime = OscTime {
    seconds: 0,
    fractional: 1,
};

/// Sends frames to the display driver, one OSC bundle per frame.
pub struct OscOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
}

impl OscOutput {
    pub fn new(target_addr: SocketAddr) -> Result<Self, String> {
        let our_addr = SocketAddr::from_str("0.0.0.0:0").map_err(|err| err.to_string())?;
        let sock = match UdpSocket::bind(our_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OscOutput { sock, target_addr })
    }
}

/// `/beadf` for every bead in index order, then `/update` so the driver
/// shows them together.
pub fn frame_packet(beads: &[Bead]) -> OscPacket {
    let mut content: Vec<OscPacket> = beads
        .iter()
        .map(|bead| {
            OscPacket::Message(OscMessage {
                addr: "/beadf".to_string(),
                args: vec![
                    OscType::Int(bead.index() as i32),
                    OscType::Float(bead.color.r),
                    OscType::Float(bead.color.g),
                    OscType::Float(bead.color.b),
                ],
            })
        })
        .collect();
    content.push(OscPacket::Message(OscMessage {
        addr: "/update".to_string(),
        args: vec![],
    }));

    OscPacket::Bundle(OscBundle {
        timetag: IMMEDIATELY,
        content,
    })
}

impl FrameSink for OscOutput {
    fn emit(&mut self, beads: &[Bead]) -> Result<(), String> {
        let msg_buf = encoder::encode(&frame_packet(beads)).map_err(|err| format!("{:?}", err))?;
        self.sock
            .send_to(&msg_buf, self.target_addr)
            .map_err(|err| format!("{}: {}", self.target_addr, err))?;
        Ok(())
    }
}
