//! Audio side channel
//!
//! Three cues: an ambient loop while playing, a click on start/pause/resume,
//! and a success chime for sessions that make the leaderboard. Everything is
//! best-effort; failures are logged and gameplay carries on.
//!
//! The ambient loop is an explicit handle owned by [`AudioChannel`], acquired
//! when a session starts and released when it pauses, ends, or the channel is
//! dropped.

use crate::error::AudioError;
use crate::settings::VolumeLevel;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Start / pause / resume
    Click,
    /// Session ended with a qualifying score
    Success,
}

/// Something that can actually make noise
pub trait AudioBackend {
    /// Handle to a running ambient loop
    type Loop;

    fn start_ambient(&mut self, gain: f32) -> Result<Self::Loop, AudioError>;
    fn stop_ambient(&mut self, handle: Self::Loop);
    fn play(&mut self, cue: SoundCue, gain: f32) -> Result<(), AudioError>;
}

/// Silent backend for native builds and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    type Loop = ();

    fn start_ambient(&mut self, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_ambient(&mut self, _handle: ()) {}

    fn play(&mut self, _cue: SoundCue, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Volume gate and ambient-loop owner in front of a backend
pub struct AudioChannel<B: AudioBackend> {
    backend: B,
    volume: VolumeLevel,
    ambient: Option<B::Loop>,
    /// Whether the session wants the loop, independent of mute
    ambient_wanted: bool,
}

impl<B: AudioBackend> AudioChannel<B> {
    pub fn new(backend: B, volume: VolumeLevel) -> Self {
        Self {
            backend,
            volume,
            ambient: None,
            ambient_wanted: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn volume(&self) -> VolumeLevel {
        self.volume
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient.is_some()
    }

    /// Change volume. Muting releases the loop; unmuting restarts it if a
    /// session still wants it.
    pub fn set_volume(&mut self, volume: VolumeLevel) {
        self.volume = volume;
        if volume.is_muted() {
            self.release_ambient();
        } else if self.ambient.is_some() {
            // Restart so the new gain applies
            self.release_ambient();
            self.acquire_ambient();
        } else if self.ambient_wanted {
            self.acquire_ambient();
        }
    }

    pub fn start_ambient(&mut self) {
        self.ambient_wanted = true;
        if self.ambient.is_none() {
            self.acquire_ambient();
        }
    }

    pub fn stop_ambient(&mut self) {
        self.ambient_wanted = false;
        self.release_ambient();
    }

    pub fn cue(&mut self, cue: SoundCue) {
        if self.volume.is_muted() {
            return;
        }
        if let Err(e) = self.backend.play(cue, self.volume.gain()) {
            log::warn!("Failed to play {:?}: {}", cue, e);
        }
    }

    fn acquire_ambient(&mut self) {
        if self.volume.is_muted() {
            return;
        }
        match self.backend.start_ambient(self.volume.gain()) {
            Ok(handle) => self.ambient = Some(handle),
            Err(e) => log::warn!("Ambient loop unavailable: {}", e),
        }
    }

    fn release_ambient(&mut self) {
        if let Some(handle) = self.ambient.take() {
            self.backend.stop_ambient(handle);
        }
    }
}

impl<B: AudioBackend> Drop for AudioChannel<B> {
    fn drop(&mut self) {
        self.release_ambient();
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

/// Web Audio oscillator backend - no asset files needed
#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, SoundCue};
    use crate::error::AudioError;

    /// Nodes kept alive while the ambient drone plays
    pub struct AmbientNodes {
        oscillators: Vec<OscillatorNode>,
        gain: GainNode,
    }

    pub struct WebAudio {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        fn context(&self) -> Result<&AudioContext, AudioError> {
            let ctx = self.ctx.as_ref().ok_or(AudioError::Unavailable)?;
            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Ok(ctx)
        }

        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            dest: &web_sys::AudioNode,
        ) -> Result<OscillatorNode, AudioError> {
            let osc = ctx.create_oscillator().map_err(js_err)?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(dest).map_err(js_err)?;
            Ok(osc)
        }

        fn create_gain(ctx: &AudioContext) -> Result<GainNode, AudioError> {
            let gain = ctx.create_gain().map_err(js_err)?;
            gain.connect_with_audio_node(&ctx.destination()).map_err(js_err)?;
            Ok(gain)
        }

        /// Short soft tick
        fn play_click(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            let gain = Self::create_gain(ctx)?;
            let osc = Self::create_osc(ctx, 660.0, OscillatorType::Sine, &gain)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).map_err(js_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .map_err(js_err)?;

            osc.start().map_err(js_err)?;
            osc.stop_with_when(t + 0.08).map_err(js_err)?;
            Ok(())
        }

        /// Rising major arpeggio
        fn play_success(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            for (i, freq) in [523.25, 659.25, 783.99, 1046.5].iter().enumerate() {
                let delay = i as f64 * 0.12;
                let gain = Self::create_gain(ctx)?;
                let osc = Self::create_osc(ctx, *freq, OscillatorType::Triangle, &gain)?;
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.35, t).map_err(js_err)?;
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                    .map_err(js_err)?;
                osc.start_with_when(t).map_err(js_err)?;
                osc.stop_with_when(t + 0.55).map_err(js_err)?;
            }
            Ok(())
        }
    }

    impl AudioBackend for WebAudio {
        type Loop = AmbientNodes;

        /// Two slightly detuned low sines for a slow-beating drone
        fn start_ambient(&mut self, vol: f32) -> Result<AmbientNodes, AudioError> {
            let ctx = self.context()?;
            let gain = Self::create_gain(ctx)?;
            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.0, t).map_err(js_err)?;
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.15, t + 1.5)
                .map_err(js_err)?;

            let mut oscillators = Vec::with_capacity(2);
            for freq in [110.0, 110.7] {
                let osc = Self::create_osc(ctx, freq, OscillatorType::Sine, &gain)?;
                osc.start().map_err(js_err)?;
                oscillators.push(osc);
            }
            Ok(AmbientNodes { oscillators, gain })
        }

        fn stop_ambient(&mut self, nodes: AmbientNodes) {
            let Ok(ctx) = self.context() else { return };
            let t = ctx.current_time();
            let _ = nodes.gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.3);
            for osc in nodes.oscillators {
                let _ = osc.stop_with_when(t + 0.35);
            }
        }

        fn play(&mut self, cue: SoundCue, vol: f32) -> Result<(), AudioError> {
            let ctx = self.context()?;
            match cue {
                SoundCue::Click => Self::play_click(ctx, vol),
                SoundCue::Success => Self::play_success(ctx, vol),
            }
        }
    }

    fn js_err(value: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Backend(format!("{:?}", value))
    }
}
