//! Fire-and-forget tones.
//!
//! Every [`AudioTrigger::play`] call starts its own voice on a
//! [`ToneBackend`] and a detached timer thread stops that voice once the
//! requested duration has elapsed on the host clock. Calls never wait for
//! each other and are never cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

/// Frequency used when neither the guest nor the configuration pick one
pub const DEFAULT_FREQUENCY: u32 = 300;
/// Duration used when the guest does not ask for one
pub const DEFAULT_DURATION: Duration = Duration::from_millis(1000);

/// A transient request for a tone. Unset fields fall back to the trigger's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToneRequest {
    pub frequency: Option<u32>,
    pub duration: Option<Duration>,
}

impl ToneRequest {
    pub fn new(frequency: u32, duration: Duration) -> Self {
        Self {
            frequency: Some(frequency),
            duration: Some(duration),
        }
    }

    /// A tone of the default frequency
    pub fn lasting(duration: Duration) -> Self {
        Self {
            frequency: None,
            duration: Some(duration),
        }
    }
}

/// Plays tones on behalf of the guest
pub trait AudioTrigger {
    fn play(&self, tone: ToneRequest);
}

/// Drops every request
pub struct Mute;

impl AudioTrigger for Mute {
    fn play(&self, _tone: ToneRequest) {}
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("speaker unavailable: {0}")]
    Speaker(String),
}

/// Identifies one started tone on a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voice(pub u64);

/// Something that can make noise. Must be shareable with the timer threads.
pub trait ToneBackend: Send + Sync + 'static {
    fn start(&self, frequency: u32) -> Result<Voice, AudioError>;
    fn stop(&self, voice: Voice) -> Result<(), AudioError>;
}

/// Join handle of the thread that will stop a tone
pub struct ToneHandle(JoinHandle<()>);

impl ToneHandle {
    /// Blocks until the tone has been stopped
    pub fn join(self) {
        let _ = self.0.join();
    }
}

/// [`AudioTrigger`] that gives every request its own voice on `B`
pub struct ToneAudio<B> {
    backend: Arc<B>,
    frequency: u32,
}

impl<B: ToneBackend> ToneAudio<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            frequency: DEFAULT_FREQUENCY,
        }
    }

    /// Sets the frequency used for requests that don't carry one
    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Starts the tone now and schedules its stop. `None` when the backend
    /// refused to start it.
    pub fn start(&self, tone: ToneRequest) -> Option<ToneHandle> {
        let frequency = tone.frequency.unwrap_or(self.frequency);
        let duration = tone.duration.unwrap_or(DEFAULT_DURATION);

        let voice = match self.backend.start(frequency) {
            Ok(voice) => voice,
            Err(error) => {
                warn!("tone at {frequency} Hz not played: {error}");
                return None;
            }
        };
        debug!("{voice:?} playing {frequency} Hz for {duration:?}");

        let backend = Arc::clone(&self.backend);
        let timer = thread::Builder::new()
            .name(format!("tone-{}", voice.0))
            .spawn(move || {
                spin_sleep::sleep(duration);
                if let Err(error) = backend.stop(voice) {
                    warn!("failed to stop {voice:?}: {error}");
                }
            });

        match timer {
            Ok(handle) => Some(ToneHandle(handle)),
            Err(error) => {
                warn!("no timer for {voice:?}, stopping it now: {error}");
                if let Err(error) = self.backend.stop(voice) {
                    warn!("failed to stop {voice:?}: {error}");
                }
                None
            }
        }
    }
}

impl<B: ToneBackend> AudioTrigger for ToneAudio<B> {
    fn play(&self, tone: ToneRequest) {
        // dropping the handle detaches the timer thread
        let _ = self.start(tone);
    }
}

/// The PC speaker, driven through the `beep` crate.
///
/// The speaker holds a single frequency, so overlapping voices stack: the
/// newest live voice is audible and stopping one falls back to the newest
/// remaining one, or silence. A voice the speaker refused never joins the stack.
pub struct PcSpeaker {
    voices: Mutex<Vec<(Voice, u16)>>,
    next: AtomicU64,
    sound: fn(u16) -> Result<(), AudioError>,
}

impl PcSpeaker {
    pub fn new() -> Self {
        Self::with_sound(sound)
    }

    fn with_sound(sound: fn(u16) -> Result<(), AudioError>) -> Self {
        Self {
            voices: Mutex::new(Vec::new()),
            next: AtomicU64::new(0),
            sound,
        }
    }
}

impl Default for PcSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneBackend for PcSpeaker {
    fn start(&self, frequency: u32) -> Result<Voice, AudioError> {
        let hertz = u16::try_from(frequency).unwrap_or(u16::MAX);
        let mut voices = self.voices.lock().unwrap_or_else(PoisonError::into_inner);
        (self.sound)(hertz)?;
        let voice = Voice(self.next.fetch_add(1, Ordering::Relaxed));
        voices.push((voice, hertz));
        Ok(voice)
    }

    fn stop(&self, voice: Voice) -> Result<(), AudioError> {
        let mut voices = self.voices.lock().unwrap_or_else(PoisonError::into_inner);
        voices.retain(|(live, _)| *live != voice);
        (self.sound)(voices.last().map_or(0, |(_, hertz)| *hertz))
    }
}

/// 0 Hz silences the speaker
fn sound(hertz: u16) -> Result<(), AudioError> {
    beep::beep(hertz).map_err(|error| AudioError::Speaker(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::time::Instant;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Start(Voice, u32),
        Stop(Voice),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(Instant, Event)>>,
        next: AtomicU64,
    }

    impl Recorder {
        fn events(&self) -> Vec<(Instant, Event)> {
            self.events.lock().unwrap().clone()
        }

        fn started_at(&self, voice: Voice) -> Instant {
            self.find(|event| matches!(event, Event::Start(v, _) if v == voice))
        }

        fn stopped_at(&self, voice: Voice) -> Instant {
            self.find(|event| event == Event::Stop(voice))
        }

        fn find(&self, wanted: impl Fn(Event) -> bool) -> Instant {
            self.events()
                .into_iter()
                .find(|(_, event)| wanted(*event))
                .map(|(at, _)| at)
                .unwrap()
        }
    }

    impl ToneBackend for Recorder {
        fn start(&self, frequency: u32) -> Result<Voice, AudioError> {
            let voice = Voice(self.next.fetch_add(1, Ordering::SeqCst));
            let event = Event::Start(voice, frequency);
            self.events.lock().unwrap().push((Instant::now(), event));
            Ok(voice)
        }

        fn stop(&self, voice: Voice) -> Result<(), AudioError> {
            let event = Event::Stop(voice);
            self.events.lock().unwrap().push((Instant::now(), event));
            Ok(())
        }
    }

    struct Broken;

    impl ToneBackend for Broken {
        fn start(&self, _frequency: u32) -> Result<Voice, AudioError> {
            Err(AudioError::Speaker("no device".into()))
        }

        fn stop(&self, _voice: Voice) -> Result<(), AudioError> {
            unreachable!("nothing was started")
        }
    }

    #[test]
    fn tone_starts_now_and_stops_after_its_duration() {
        let audio = ToneAudio::new(Recorder::default());
        let requested = Instant::now();
        let handle = audio
            .start(ToneRequest::new(440, Duration::from_millis(500)))
            .unwrap();

        let started = audio.backend().started_at(Voice(0));
        assert!(started.duration_since(requested) < Duration::from_millis(100));
        assert_eq!(audio.backend().events().len(), 1);

        handle.join();
        let stopped = audio.backend().stopped_at(Voice(0));
        let played = stopped.duration_since(started);
        assert!(played >= Duration::from_millis(500), "{played:?}");
        assert!(played < Duration::from_millis(1500), "{played:?}");
    }

    #[test]
    fn overlapping_tones_stop_independently() {
        let audio = ToneAudio::new(Recorder::default());
        let long = audio
            .start(ToneRequest::new(300, Duration::from_millis(300)))
            .unwrap();
        let short = audio
            .start(ToneRequest::new(600, Duration::from_millis(50)))
            .unwrap();

        short.join();
        let events = audio.backend().events();
        assert!(events.iter().any(|(_, e)| *e == Event::Stop(Voice(1))));
        assert!(!events.iter().any(|(_, e)| *e == Event::Stop(Voice(0))));

        long.join();
        let recorder = audio.backend();
        assert!(recorder.stopped_at(Voice(1)) < recorder.stopped_at(Voice(0)));
        assert!(
            recorder.stopped_at(Voice(0)).duration_since(recorder.started_at(Voice(0)))
                >= Duration::from_millis(300)
        );
    }

    #[test]
    fn unset_fields_use_the_defaults() {
        let audio = ToneAudio::new(Recorder::default()).with_frequency(880);
        let handle = audio
            .start(ToneRequest::lasting(Duration::from_millis(1)))
            .unwrap();
        handle.join();
        assert_eq!(
            audio.backend().events()[0].1,
            Event::Start(Voice(0), 880)
        );
        assert_eq!(ToneRequest::default().duration.unwrap_or(DEFAULT_DURATION), DEFAULT_DURATION);
    }

    #[test]
    fn backend_failures_are_not_fatal() {
        let audio = ToneAudio::new(Broken);
        assert!(audio.start(ToneRequest::default()).is_none());
        audio.play(ToneRequest::default());
    }

    thread_local! {
        static SPEAKER_BROKEN: Cell<bool> = const { Cell::new(false) };
        static SPEAKER: RefCell<Vec<u16>> = const { RefCell::new(Vec::new()) };
    }

    /// A speaker that plays nothing while `SPEAKER_BROKEN` is set
    fn flaky_sound(hertz: u16) -> Result<(), AudioError> {
        if SPEAKER_BROKEN.get() {
            return Err(AudioError::Speaker("no console".into()));
        }
        SPEAKER.with_borrow_mut(|heard| heard.push(hertz));
        Ok(())
    }

    #[test]
    fn refused_voices_never_stay_on_the_speaker() {
        let speaker = PcSpeaker::with_sound(flaky_sound);

        SPEAKER_BROKEN.set(true);
        for _ in 0..5 {
            assert!(speaker.start(300).is_err());
        }
        assert!(speaker.voices.lock().unwrap().is_empty());

        SPEAKER_BROKEN.set(false);
        let voice = speaker.start(440).unwrap();
        speaker.stop(voice).unwrap();

        assert!(speaker.voices.lock().unwrap().is_empty());
        assert_eq!(SPEAKER.with_borrow(|heard| heard.clone()), vec![440, 0]);
    }

    #[test]
    fn stopping_a_voice_falls_back_to_the_newest_live_one() {
        let speaker = PcSpeaker::with_sound(flaky_sound);
        let low = speaker.start(200).unwrap();
        let high = speaker.start(800).unwrap();

        speaker.stop(high).unwrap();
        speaker.stop(low).unwrap();
        assert_eq!(
            SPEAKER.with_borrow(|heard| heard.clone()),
            vec![200, 800, 200, 0]
        );
    }
}
