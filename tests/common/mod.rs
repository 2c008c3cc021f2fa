#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use lectern::error::{SpeechError, StoreError};
use lectern::highlights::context_key;
use lectern::models::{
    ColumnMode, FlowMode, Highlight, PageDescriptor, RangeToken, ReadingPosition, ReadingSettings,
    Relocation, TextSelection,
};
use lectern::reader::ReadingSession;
use lectern::reader::tts::SpeechEngine;
use lectern::rendition::{ContentFrame, Rendition};
use lectern::state::{KeyValueStore, MemoryStore};

/// Store whose contents stay visible to the test after the session takes it.
#[derive(Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemoryStore>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().remove(key)
    }
}

impl SharedStore {
    pub fn raw(&self, source: &str) -> Option<String> {
        self.0.borrow().get(&context_key(source)).unwrap()
    }

    pub fn persisted(&self, source: &str) -> Vec<Highlight> {
        self.raw(source)
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }
}

/// Store that refuses every write.
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("read-only")))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("read-only")))
    }
}

#[derive(Default)]
pub struct EngineLog {
    pub calls: Vec<String>,
    pub selection: Option<TextSelection>,
    pub listener: Option<Box<dyn FnMut(Relocation)>>,
}

impl EngineLog {
    pub fn select(&mut self, range: &str, text: &str) {
        self.selection = Some(TextSelection {
            range: RangeToken::new(range),
            text: text.to_string(),
        });
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

pub type SharedEngine = Rc<RefCell<EngineLog>>;

pub struct Frame {
    log: SharedEngine,
}

impl ContentFrame for Frame {
    fn selection(&self) -> Option<TextSelection> {
        self.log.borrow().selection.clone()
    }

    fn clear_selection(&mut self) {
        let mut log = self.log.borrow_mut();
        log.selection = None;
        log.calls.push("clear-selection".into());
    }
}

pub struct FakeRendition {
    log: SharedEngine,
    frame: Frame,
}

impl FakeRendition {
    pub fn new() -> (Self, SharedEngine) {
        let log: SharedEngine = Rc::new(RefCell::new(EngineLog::default()));
        let rendition = Self {
            log: log.clone(),
            frame: Frame { log: log.clone() },
        };
        (rendition, log)
    }

    fn record(&self, call: String) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl Rendition for FakeRendition {
    fn set_font_size(&mut self, px: u32) {
        self.record(format!("font {px}"));
    }

    fn set_flow(&mut self, mode: FlowMode) {
        self.record(format!("flow {}", mode.as_str()));
    }

    fn set_spread(&mut self, mode: ColumnMode) {
        self.record(format!("spread {}", mode.as_str()));
    }

    fn next(&mut self) {
        self.record("next".into());
    }

    fn prev(&mut self) {
        self.record("prev".into());
    }

    fn display(&mut self, position: &ReadingPosition) {
        self.record(format!("display {}", position.token().unwrap_or("start")));
    }

    fn add_annotation(&mut self, kind: &str, range: &RangeToken, _class_name: &str) {
        self.record(format!("add {kind} {range}"));
    }

    fn remove_annotation(&mut self, range: &RangeToken, kind: &str) {
        self.record(format!("remove {kind} {range}"));
    }

    fn contents(&mut self) -> Vec<&mut dyn ContentFrame> {
        vec![&mut self.frame as &mut dyn ContentFrame]
    }

    fn on_relocated(&mut self, listener: Box<dyn FnMut(Relocation)>) {
        self.log.borrow_mut().listener = Some(listener);
    }
}

pub fn relocate(log: &SharedEngine, token: &str, current: u32, total: u32) {
    let mut listener = log
        .borrow_mut()
        .listener
        .take()
        .expect("relocation listener registered");
    listener(Relocation {
        position: ReadingPosition::Token(token.to_string()),
        page: PageDescriptor { current, total },
    });
    log.borrow_mut().listener = Some(listener);
}

#[derive(Default)]
pub struct SpeechLog {
    pub spoken: Vec<String>,
    pub cancelled: usize,
    pub pending: Option<Box<dyn FnOnce()>>,
}

pub type SharedSpeech = Rc<RefCell<SpeechLog>>;

pub struct FakeSpeech {
    log: SharedSpeech,
}

impl FakeSpeech {
    pub fn new() -> (Self, SharedSpeech) {
        let log: SharedSpeech = Rc::new(RefCell::new(SpeechLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl SpeechEngine for FakeSpeech {
    fn speak(&mut self, text: &str, on_complete: Box<dyn FnOnce()>) -> Result<(), SpeechError> {
        let mut log = self.log.borrow_mut();
        log.spoken.push(text.to_string());
        log.pending = Some(on_complete);
        Ok(())
    }

    fn cancel(&mut self) {
        let mut log = self.log.borrow_mut();
        log.cancelled += 1;
        log.pending = None;
    }

    fn is_speaking(&self) -> bool {
        self.log.borrow().pending.is_some()
    }
}

pub fn finish_speaking(log: &SharedSpeech) {
    let callback = log.borrow_mut().pending.take().expect("utterance in progress");
    callback();
}

pub struct Harness {
    pub session: ReadingSession,
    pub store: SharedStore,
    pub engine: SharedEngine,
    pub speech: SharedSpeech,
}

/// Session for `source` with an attached fake engine.
pub fn harness(source: &str) -> Harness {
    harness_with_store(source, SharedStore::default())
}

pub fn harness_with_store(source: &str, store: SharedStore) -> Harness {
    let (speech_engine, speech) = FakeSpeech::new();
    let mut session = ReadingSession::initialize(
        Some(source),
        Box::new(store.clone()),
        Box::new(speech_engine),
        ReadingSettings::default(),
    )
    .unwrap();
    let (rendition, engine) = FakeRendition::new();
    session.attach_rendition(Box::new(rendition));
    engine.borrow_mut().calls.clear();
    Harness {
        session,
        store,
        engine,
        speech,
    }
}
