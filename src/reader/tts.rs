use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::error::SpeechError;

/// Text-to-speech backend. `on_complete` must run on the session thread,
/// either directly from `speak`/`pump` or from whatever drives the session.
pub trait SpeechEngine {
    fn speak(&mut self, text: &str, on_complete: Box<dyn FnOnce()>) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    fn is_speaking(&self) -> bool;

    /// Delivers pending completions for engines that have to be polled.
    fn pump(&mut self) {}
}

/// Owns the busy flag for a single active utterance.
pub struct SpeechController {
    engine: Box<dyn SpeechEngine>,
    speaking: Rc<Cell<bool>>,
    // Bumped on every start/stop so a late callback from a cancelled
    // utterance cannot clear the flag of a newer one.
    generation: Rc<Cell<u64>>,
}

impl SpeechController {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            speaking: Rc::new(Cell::new(false)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.get()
    }

    pub fn can_speak(&self) -> bool {
        !self.is_speaking()
    }

    pub fn can_stop(&self) -> bool {
        self.is_speaking()
    }

    /// Starts reading `text` aloud. Returns `Ok(false)` without touching the
    /// engine when there is nothing to say or an utterance is already active.
    pub fn speak(&mut self, text: &str) -> Result<bool, SpeechError> {
        if text.trim().is_empty() || self.is_speaking() {
            return Ok(false);
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.speaking.set(true);

        let speaking = self.speaking.clone();
        let current = self.generation.clone();
        let on_complete = Box::new(move || {
            if current.get() == generation {
                speaking.set(false);
                log::debug!("Utterance {generation} finished");
            }
        });

        if let Err(err) = self.engine.speak(text, on_complete) {
            self.speaking.set(false);
            return Err(err);
        }
        log::debug!("Speaking utterance {generation} ({} chars)", text.len());
        Ok(true)
    }

    pub fn stop(&mut self) {
        if !self.is_speaking() {
            return;
        }
        self.generation.set(self.generation.get() + 1);
        if self.engine.is_speaking() {
            self.engine.cancel();
        }
        self.speaking.set(false);
        log::debug!("Speech stopped");
    }

    pub fn pump(&mut self) {
        self.engine.pump();
    }
}

/// Speaks through an external program (`edge-playback`, `espeak`, `say`, or a
/// custom command where `{}` is replaced by the text).
pub struct CommandSpeech {
    engine: String,
    extra_args: Vec<String>,
    kill_pid: Option<u32>,
    done_rx: Option<Receiver<()>>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl CommandSpeech {
    pub fn new(engine: Option<String>, extra_args: Vec<String>) -> Self {
        Self {
            engine: engine.unwrap_or_default(),
            extra_args,
            kill_pid: None,
            done_rx: None,
            on_complete: None,
        }
    }

    /// Program and arguments used to speak `text`.
    pub fn command_for(&self, text: &str) -> Result<(String, Vec<String>), SpeechError> {
        let engine = self.engine.trim();
        let (program, mut args) = if engine.is_empty() || engine == "edge-playback" {
            (
                "edge-playback".to_string(),
                vec!["--text".to_string(), text.to_string()],
            )
        } else if engine == "espeak" || engine == "say" {
            (engine.to_string(), vec![text.to_string()])
        } else if engine.contains("{}") {
            let mut parts = engine.split_whitespace();
            let program = parts.next().ok_or(SpeechError::EmptyCommand)?.to_string();
            let args = parts.map(|part| part.replace("{}", text)).collect();
            (program, args)
        } else {
            (engine.to_string(), vec![text.to_string()])
        };
        args.extend(self.extra_args.iter().cloned());
        Ok((program, args))
    }

    fn finish(&mut self) {
        self.kill_pid = None;
        self.done_rx = None;
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl SpeechEngine for CommandSpeech {
    fn speak(&mut self, text: &str, on_complete: Box<dyn FnOnce()>) -> Result<(), SpeechError> {
        let (program, args) = self.command_for(text)?;

        let mut cmd = std::process::Command::new(&program);
        cmd.args(&args)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());

        // Own process group, so cancel() also takes down players the engine
        // spawns (edge-playback starts mpv).
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        let mut child = cmd.spawn().map_err(|source| {
            log::error!("TTS failed: {source}");
            SpeechError::Spawn {
                program: program.clone(),
                source,
            }
        })?;

        let (tx, rx) = mpsc::channel();
        self.kill_pid = Some(child.id());
        self.done_rx = Some(rx);
        self.on_complete = Some(on_complete);
        std::thread::spawn(move || {
            let _ = child.wait();
            let _ = tx.send(());
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(pid) = self.kill_pid.take() {
            #[cfg(unix)]
            unsafe {
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
            #[cfg(not(unix))]
            log::warn!("Cannot cancel TTS process {pid} on this platform");
        }
        self.done_rx = None;
        self.on_complete = None;
    }

    fn is_speaking(&self) -> bool {
        self.done_rx.is_some()
    }

    fn pump(&mut self) {
        let finished = match &self.done_rx {
            Some(rx) => match rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => true,
                Err(TryRecvError::Empty) => false,
            },
            None => false,
        };
        if finished {
            self.finish();
        }
    }
}
