use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::beads::{Bead, BeadRing};
use crate::color::{Color, EffectColor};
use crate::effects::{Effect, EffectId, EffectOptions, Orientation};
use crate::error::{Error, Result};
use crate::exposure;
use crate::intervaltimer::IntervalTimer;
use crate::registry::{EffectRegistry, Knobs};

/// Receives the bead colors once per cycle, after every effect has ticked.
pub trait FrameSink {
    fn emit(&mut self, beads: &[Bead]) -> std::result::Result<(), String>;
}

/// Requests from other threads. They are applied between cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        name: String,
        beads: String,
        color: Color,
        orientation: Orientation,
        knobs: Knobs,
    },
    Remove(EffectId),
    Clear,
    Invoke {
        id: EffectId,
        method: String,
        args: Vec<f32>,
    },
    SetBeads {
        id: EffectId,
        beads: String,
    },
    Pause,
    Resume,
}

pub struct Mainloop<S: FrameSink> {
    ring: BeadRing,
    registry: EffectRegistry,
    effects: Vec<Effect>,
    last_id: u32,
    sink: S,
    interval: Duration,
    running: Arc<AtomicBool>,
    paused: bool,
    commands: Option<Receiver<Command>>,
}

impl<S: FrameSink> Mainloop<S> {
    pub fn new(ring: BeadRing, registry: EffectRegistry, sink: S, interval: Duration) -> Self {
        Mainloop {
            ring,
            registry,
            effects: Vec::new(),
            last_id: 0,
            sink,
            interval,
            running: Arc::new(AtomicBool::new(true)),
            paused: false,
            commands: None,
        }
    }

    pub fn ring(&self) -> &BeadRing {
        &self.ring
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|effect| effect.id() == Some(id))
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|effect| effect.id() == Some(id))
    }

    /// Flag checked once per cycle. Clearing it stops [`Mainloop::run`].
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Creates the queue other threads use to reach this loop. Calling it
    /// again replaces the previous queue.
    pub fn command_sender(&mut self) -> Sender<Command> {
        let (sender, receiver) = mpsc::channel();
        self.commands = Some(receiver);
        sender
    }

    /// The effect may have been built against another ring, so its beads are
    /// checked against this one before it gets an id.
    pub fn attach(&mut self, mut effect: Effect) -> Result<EffectId> {
        self.ring.validate(effect.bead_set())?;
        let id = EffectId(self.last_id + 1);
        effect.attach(id)?;
        self.last_id = id.0;
        log::debug!("Attached {} {}", effect.name(), id);
        self.effects.push(effect);
        Ok(id)
    }

    /// Builds an effect through the registry and attaches it.
    pub fn add(
        &mut self,
        name: &str,
        options: EffectOptions,
        knobs: &Knobs,
    ) -> Result<EffectId> {
        let effect = self.registry.create(name, knobs, options, &self.ring)?;
        self.attach(effect)
    }

    pub fn remove(&mut self, id: EffectId) -> Result<Effect> {
        let position = self
            .effects
            .iter()
            .position(|effect| effect.id() == Some(id))
            .ok_or(Error::UnknownEffectId(id))?;
        log::debug!("Removed {}", id);
        Ok(self.effects.remove(position))
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn invoke(&mut self, id: EffectId, method: &str, args: &[f32]) -> Result<()> {
        let effect = self.effect_mut(id).ok_or(Error::UnknownEffectId(id))?;
        exposure::invoke(effect, method, args)
    }

    /// Moves an effect onto the beads named by `expr`, e.g. `stem|eighth0`.
    pub fn set_beads(&mut self, id: EffectId, expr: &str) -> Result<()> {
        let set = self.ring.parse_set(expr)?;
        let ring = &self.ring;
        let effect = self
            .effects
            .iter_mut()
            .find(|effect| effect.id() == Some(id))
            .ok_or(Error::UnknownEffectId(id))?;
        effect.set_bead_set(set, ring)
    }

    /// Ticks every effect, drops the finished ones and emits one frame.
    pub fn run_cycle(&mut self) {
        for effect in &mut self.effects {
            if let Err(err) = effect.tick(&mut self.ring) {
                log::warn!("{} {} failed this cycle: {}", effect.name(), display_id(effect), err);
            }
        }

        self.effects.retain(|effect| {
            if effect.is_finished() {
                log::debug!("{} {} finished", effect.name(), display_id(effect));
            }
            !effect.is_finished()
        });

        if let Err(err) = self.sink.emit(self.ring.beads()) {
            log::warn!("Failed to emit frame: {}", err);
        }
    }

    /// Applies every queued command. Returns false once all senders are gone.
    pub fn drain_commands(&mut self) -> bool {
        loop {
            let command = match &self.commands {
                Some(commands) => commands.try_recv(),
                None => return true,
            };
            match command {
                Ok(command) => self.handle(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    self.commands = None;
                    return false;
                }
            }
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Add {
                name,
                beads,
                color,
                orientation,
                knobs,
            } => {
                let result = self.ring.parse_set(&beads).and_then(|set| {
                    let options = EffectOptions {
                        beads: set,
                        color: EffectColor::Solid(color),
                        orientation,
                        ..Default::default()
                    };
                    self.add(&name, options, &knobs)
                });
                match result {
                    Ok(id) => log::info!("Added {} on {} as {}", name, beads, id),
                    Err(err) => log::warn!("Cannot add {}: {}", name, err),
                }
            }
            Command::Remove(id) => {
                if let Err(err) = self.remove(id) {
                    log::warn!("Cannot remove effect: {}", err);
                }
            }
            Command::Clear => self.clear(),
            Command::Invoke { id, method, args } => {
                if let Err(err) = self.invoke(id, &method, &args) {
                    log::warn!("Cannot call {} on {}: {}", method, id, err);
                }
            }
            Command::SetBeads { id, beads } => {
                if let Err(err) = self.set_beads(id, &beads) {
                    log::warn!("Cannot move {} to {}: {}", id, beads, err);
                }
            }
            Command::Pause => self.paused = true,
            Command::Resume => self.paused = false,
        }
    }

    /// Runs cycles until the running flag is cleared. The flag is only
    /// looked at between cycles.
    pub fn run(&mut self) {
        let mut timer = IntervalTimer::new(self.interval, true);
        log::info!(
            "Mainloop running every {:?} on {} beads",
            timer.interval(),
            self.ring.len()
        );

        while self.running.load(Ordering::SeqCst) {
            self.drain_commands();
            if !self.paused {
                self.run_cycle();
            }
            timer.sleep();
        }

        log::info!("Mainloop stopped with {} effects", self.effects.len());
    }
}

fn display_id(effect: &Effect) -> String {
    match effect.id() {
        Some(id) => id.to_string(),
        None => "(detached)".to_string(),
    }
}
