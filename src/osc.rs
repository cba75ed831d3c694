use std::{
    net::{SocketAddr, UdpSocket},
    sync::mpsc::Sender,
};

use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::color::Color;
use crate::effects::{EffectId, Orientation};
use crate::mainloop::Command;
use crate::registry::Knobs;

/// Turns OSC messages from a controller into mainloop commands.
///
/// * `/effect/add name beads r g b [knob value]...`
/// * `/effect/del id`
/// * `/effect/clear`
/// * `/effect/<id>/set_beads beads`
/// * `/effect/<id>/<method> args...`
/// * `/mainloop/pause`, `/mainloop/resume`
pub struct OscReceiver {
    sock: UdpSocket,
    commands: Sender<Command>,
}

impl OscReceiver {
    pub fn new(listen_addr: SocketAddr, commands: Sender<Command>) -> Result<Self, String> {
        let sock = match UdpSocket::bind(listen_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OscReceiver { sock, commands })
    }

    pub fn run(&self) {
        let mut buf = [0u8; decoder::MTU];

        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::debug!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode_udp(&buf[..size]) {
                        Ok((_, packet)) => {
                            if !self.handle_packet(packet) {
                                break;
                            }
                        }
                        Err(err) => log::warn!("Dropping malformed packet from {}: {:?}", addr, err),
                    }
                }
                Err(e) => {
                    log::error!("Error receiving from socket: {}", e);
                    break;
                }
            }
        }
    }

    /// Returns false once the mainloop is gone.
    fn handle_packet(&self, packet: OscPacket) -> bool {
        match packet {
            OscPacket::Message(msg) => match parse_message(&msg) {
                Ok(command) => self.commands.send(command).is_ok(),
                Err(err) => {
                    log::warn!("{}", err);
                    true
                }
            },
            OscPacket::Bundle(bundle) => bundle
                .content
                .into_iter()
                .all(|packet| self.handle_packet(packet)),
        }
    }
}

pub fn parse_message(msg: &OscMessage) -> Result<Command, String> {
    let parts: Vec<&str> = msg.addr.trim_start_matches('/').split('/').collect();
    match parts.as_slice() {
        ["effect", "add"] => parse_add(msg),
        ["effect", "del"] => {
            expect_args(msg, 1)?;
            let id = extract_int_argument(msg, &msg.args[0])?;
            Ok(Command::Remove(effect_id(msg, id)?))
        }
        ["effect", "clear"] => Ok(Command::Clear),
        ["effect", id, "set_beads"] => {
            expect_args(msg, 1)?;
            Ok(Command::SetBeads {
                id: parse_effect_id(msg, id)?,
                beads: extract_string_argument(msg, &msg.args[0])?,
            })
        }
        ["effect", id, method] => {
            let id = parse_effect_id(msg, id)?;
            let args = msg
                .args
                .iter()
                .map(|arg| extract_float_argument(msg, arg))
                .collect::<Result<Vec<f32>, String>>()?;
            Ok(Command::Invoke {
                id,
                method: method.to_string(),
                args,
            })
        }
        ["mainloop", "pause"] => Ok(Command::Pause),
        ["mainloop", "resume"] => Ok(Command::Resume),
        _ => Err(format!("Unhandled OSC address: {} {:?}", msg.addr, msg.args)),
    }
}

fn parse_add(msg: &OscMessage) -> Result<Command, String> {
    if msg.args.len() < 5 || (msg.args.len() - 5) % 2 != 0 {
        return Err(format!(
            "{} expects name, beads, r, g, b and knob pairs",
            msg.addr
        ));
    }

    let name = extract_string_argument(msg, &msg.args[0])?;
    let beads = extract_string_argument(msg, &msg.args[1])?;
    let color = Color::rgb(
        extract_float_argument(msg, &msg.args[2])?,
        extract_float_argument(msg, &msg.args[3])?,
        extract_float_argument(msg, &msg.args[4])?,
    );

    let mut orientation = Orientation::default();
    let mut knobs = Knobs::new();
    for pair in msg.args[5..].chunks(2) {
        let knob = extract_string_argument(msg, &pair[0])?;
        if knob == "orientation" {
            orientation = Orientation::from_name(&extract_string_argument(msg, &pair[1])?);
        } else {
            knobs.insert(knob, extract_float_argument(msg, &pair[1])?);
        }
    }

    Ok(Command::Add {
        name,
        beads,
        color,
        orientation,
        knobs,
    })
}

fn expect_args(msg: &OscMessage, count: usize) -> Result<(), String> {
    if msg.args.len() != count {
        return Err(format!("{} expected {} parameters", msg.addr, count));
    }
    Ok(())
}

fn parse_effect_id(msg: &OscMessage, id: &str) -> Result<EffectId, String> {
    id.parse::<u32>()
        .map(EffectId)
        .map_err(|_| format!("{} Bad effect id: {}", msg.addr, id))
}

fn effect_id(msg: &OscMessage, id: i32) -> Result<EffectId, String> {
    u32::try_from(id)
        .map(EffectId)
        .map_err(|_| format!("{} Bad effect id: {}", msg.addr, id))
}

fn extract_float_argument(msg: &OscMessage, arg: &OscType) -> Result<f32, String> {
    match arg {
        OscType::Float(value) => Ok(*value),
        OscType::Int(value) => Ok(*value as f32),
        OscType::Double(value) => Ok(*value as f32),
        _ => Err(format!(
            "{} Unexpected OSC parameter type: {:?}",
            msg.addr, arg
        )),
    }
}

fn extract_int_argument(msg: &OscMessage, arg: &OscType) -> Result<i32, String> {
    match arg {
        OscType::Int(value) => Ok(*value),
        OscType::Float(value) if value.fract() == 0.0 => Ok(*value as i32),
        _ => Err(format!(
            "{} Unexpected OSC parameter type: {:?}",
            msg.addr, arg
        )),
    }
}

fn extract_string_argument(msg: &OscMessage, arg: &OscType) -> Result<String, String> {
    match arg {
        OscType::String(value) => Ok(value.clone()),
        _ => Err(format!(
            "{} Unexpected OSC parameter type: {:?}",
            msg.addr, arg
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[test]
    fn parses_add_with_knobs() {
        let msg = message(
            "/effect/add",
            vec![
                OscType::String("sine_wave".to_string()),
                OscType::String("half01".to_string()),
                OscType::Float(1.0),
                OscType::Int(0),
                OscType::Float(0.5),
                OscType::String("period".to_string()),
                OscType::Int(2),
                OscType::String("orientation".to_string()),
                OscType::String("ccw".to_string()),
            ],
        );
        assert_eq!(
            parse_message(&msg),
            Ok(Command::Add {
                name: "sine_wave".to_string(),
                beads: "half01".to_string(),
                color: Color::rgb(1.0, 0.0, 0.5),
                orientation: Orientation::CounterClockwise,
                knobs: [("period".to_string(), 2.0)].into_iter().collect(),
            })
        );
    }

    #[test]
    fn rejects_incomplete_add() {
        let msg = message(
            "/effect/add",
            vec![
                OscType::String("throb".to_string()),
                OscType::String("all".to_string()),
                OscType::Float(1.0),
            ],
        );
        assert!(parse_message(&msg).is_err());
    }

    #[test]
    fn parses_method_calls() {
        let msg = message(
            "/effect/12/set_color",
            vec![OscType::Float(0.1), OscType::Int(1), OscType::Float(0.0)],
        );
        assert_eq!(
            parse_message(&msg),
            Ok(Command::Invoke {
                id: EffectId(12),
                method: "set_color".to_string(),
                args: vec![0.1, 1.0, 0.0],
            })
        );
        let msg = message("/effect/abc/fade_out", vec![OscType::Int(30)]);
        assert!(parse_message(&msg).is_err());
    }

    #[test]
    fn parses_bead_set_changes() {
        let msg = message(
            "/effect/5/set_beads",
            vec![OscType::String("stem|eighth3".to_string())],
        );
        assert_eq!(
            parse_message(&msg),
            Ok(Command::SetBeads {
                id: EffectId(5),
                beads: "stem|eighth3".to_string(),
            })
        );
        let msg = message("/effect/5/set_beads", vec![OscType::Float(1.0)]);
        assert!(parse_message(&msg).is_err());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(
            parse_message(&message("/effect/del", vec![OscType::Int(3)])),
            Ok(Command::Remove(EffectId(3)))
        );
        assert!(parse_message(&message("/effect/del", vec![OscType::Int(-3)])).is_err());
        assert_eq!(
            parse_message(&message("/effect/clear", vec![])),
            Ok(Command::Clear)
        );
        assert_eq!(
            parse_message(&message("/mainloop/pause", vec![])),
            Ok(Command::Pause)
        );
        assert!(parse_message(&message("/effect", vec![])).is_err());
    }

    #[test]
    fn forwards_bundled_messages() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let osc = OscReceiver::new("127.0.0.1:0".parse().unwrap(), sender).unwrap();
        let bundle = OscPacket::Bundle(rosc::OscBundle {
            timetag: rosc::OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(message("/mainloop/pause", vec![])),
                OscPacket::Message(message("/nonsense", vec![])),
                OscPacket::Message(message("/mainloop/resume", vec![])),
            ],
        });
        assert!(osc.handle_packet(bundle));
        assert_eq!(receiver.try_recv(), Ok(Command::Pause));
        assert_eq!(receiver.try_recv(), Ok(Command::Resume));
        assert!(receiver.try_recv().is_err());
    }
}
