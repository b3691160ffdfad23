/// Sound engine: clip playback via rodio.
///
/// Three one-shot channels (jump, victory, game over) and one looping
/// ambient track. Each channel owns at most one Sink: playing a cue stops
/// whatever that channel was playing and starts it from the beginning.
/// A missing clip leaves its channel silent.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use crate::ui::assets::SoundClips;

    const AMBIENT_VOLUME: f32 = 0.3;

    /// One clip plus the sink currently playing it.
    struct Channel {
        clip: Option<Arc<Vec<u8>>>,
        sink: Option<Sink>,
    }

    impl Channel {
        fn new(clip: Option<Arc<Vec<u8>>>) -> Self {
            Channel { clip, sink: None }
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }

        fn restart(&mut self, handle: &OutputStreamHandle, looped: bool, volume: f32) {
            self.stop();
            let Some(buf) = &self.clip else { return };
            let sink = match Sink::try_new(handle) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("audio sink unavailable: {e}");
                    return;
                }
            };
            let cursor = Cursor::new(buf.as_ref().clone());
            if looped {
                match Decoder::new_looped(cursor) {
                    Ok(src) => sink.append(src),
                    Err(e) => {
                        tracing::warn!("could not decode clip: {e}");
                        return;
                    }
                }
            } else {
                match Decoder::new(cursor) {
                    Ok(src) => sink.append(src),
                    Err(e) => {
                        tracing::warn!("could not decode clip: {e}");
                        return;
                    }
                }
            }
            sink.set_volume(volume);
            self.sink = Some(sink);
        }
    }

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Channel,
        victory: Channel,
        game_over: Channel,
        ambient: Channel,
    }

    impl SoundEngine {
        pub fn new(clips: &SoundClips) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("no audio output: {e}");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: Channel::new(clips.jump.clone()),
                victory: Channel::new(clips.victory.clone()),
                game_over: Channel::new(clips.game_over.clone()),
                ambient: Channel::new(clips.ambient.clone()),
            })
        }

        pub fn play_jump(&mut self) { self.jump.restart(&self.handle, false, 1.0); }
        pub fn play_victory(&mut self) { self.victory.restart(&self.handle, false, 1.0); }
        pub fn play_game_over(&mut self) { self.game_over.restart(&self.handle, false, 1.0); }

        pub fn start_ambient(&mut self) {
            self.ambient.restart(&self.handle, true, AMBIENT_VOLUME);
        }

        pub fn stop_ambient(&mut self) {
            self.ambient.stop();
        }

        pub fn stop_all(&mut self) {
            self.jump.stop();
            self.victory.stop();
            self.game_over.stop();
            self.ambient.stop();
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

use crate::sim::event::GameEvent;

// ── Event → cue mapping ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Jump,
    StartAmbient,
    Victory,
    GameOver,
    StopAll,
}

pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::Jumped => Some(Cue::Jump),
        GameEvent::MusicStarted => Some(Cue::StartAmbient),
        GameEvent::Victory => Some(Cue::Victory),
        GameEvent::GameOver => Some(Cue::GameOver),
        GameEvent::Restarted => Some(Cue::StopAll),
        _ => None,
    }
}

/// End cues silence the ambient track before playing.
pub fn play_events(engine: &mut SoundEngine, events: &[GameEvent]) {
    for cue in events.iter().filter_map(cue_for) {
        match cue {
            Cue::Jump => engine.play_jump(),
            Cue::StartAmbient => engine.start_ambient(),
            Cue::Victory => {
                engine.stop_ambient();
                engine.play_victory();
            }
            Cue::GameOver => {
                engine.stop_ambient();
                engine.play_game_over();
            }
            Cue::StopAll => engine.stop_all(),
        }
    }
}

// ── Stub when sound feature is disabled ──

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_clips: &super::assets::SoundClips) -> Option<Self> { None }
    pub fn play_jump(&mut self) {}
    pub fn play_victory(&mut self) {}
    pub fn play_game_over(&mut self) {}
    pub fn start_ambient(&mut self) {}
    pub fn stop_ambient(&mut self) {}
    pub fn stop_all(&mut self) {}
}
