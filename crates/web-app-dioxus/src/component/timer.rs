use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use futures_util::StreamExt;
use gloo_timers::future::IntervalStream;
use log::error;

/// Displays the rest countdown. Keeps counting into overtime after the
/// resume time has passed instead of clamping at zero.
#[component]
pub fn RestCountdown(timer: Signal<RestTimer>, mini: Option<bool>) -> Element {
    use_coroutine(move |_: UnboundedReceiver<()>| async move {
        let mut timer = timer;
        let mut interval = IntervalStream::new(1000);
        loop {
            interval.next().await;
            timer.write().update();
        }
    });

    let mini = mini.unwrap_or_default();
    rsx! {
        div {
            class: "has-text-centered has-text-weight-bold",
            class: if mini { "is-size-6" } else { "is-size-2" },
            class: if timer.read().is_complete() { "has-text-danger is-blinking" },
            "{timer.read().display()}"
        }
    }
}

/// Countdown to a resume timestamp. Started fresh every time a rest period
/// begins; there is no pause or resume.
#[derive(Clone)]
pub struct RestTimer {
    resume_time: Option<DateTime<Utc>>,
    remaining_seconds: i64,
    audio_context: Option<web_sys::AudioContext>,
    beep_time: f64,
    beep_volume: u8,
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            resume_time: None,
            remaining_seconds: 0,
            audio_context: match web_sys::AudioContext::new() {
                Ok(audio_context) => Some(audio_context),
                Err(err) => {
                    error!("failed to create audio context: {err:?}");
                    None
                }
            },
            beep_time: 0.,
            beep_volume: 100,
        }
    }

    pub fn start(&mut self, resume_time: DateTime<Utc>) {
        self.resume_time = Some(resume_time);
        self.beep_time = 0.;
        self.update();
    }

    pub fn clear(&mut self) {
        self.resume_time = None;
        self.remaining_seconds = 0;
        self.beep_time = 0.;
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.resume_time.is_some()
    }

    /// Negative once the resume time has passed (overtime).
    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_set() && self.remaining_seconds <= 0
    }

    pub fn set_beep_volume(&mut self, beep_volume: u8) {
        self.beep_volume = beep_volume;
    }

    #[must_use]
    pub fn display(&self) -> String {
        let seconds = self.remaining_seconds.abs();
        format!(
            "{}{}:{:02}",
            if self.remaining_seconds < 0 { "-" } else { "" },
            seconds / 60,
            seconds % 60
        )
    }

    pub fn update(&mut self) {
        let Some(resume_time) = self.resume_time else {
            return;
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let remaining_seconds = (resume_time
            .signed_duration_since(Utc::now())
            .num_milliseconds() as f64
            / 1000.)
            .round() as i64;
        if let Some(audio_context) = &self.audio_context {
            if remaining_seconds == 10 {
                for offset in [0.01, 0.18] {
                    self.beep_time = audio_context.current_time() + offset;
                    if let Err(err) = play_beep(
                        audio_context,
                        2000.,
                        self.beep_time,
                        0.1,
                        self.beep_volume,
                    ) {
                        error!("failed to play beep: {err:?}");
                    }
                }
            }
            if (0..=2).contains(&remaining_seconds) {
                if remaining_seconds == 2 {
                    self.beep_time = audio_context.current_time() + 0.01;
                } else {
                    self.beep_time += 1.;
                }
                if let Err(err) = play_beep(
                    audio_context,
                    2000.,
                    self.beep_time,
                    if remaining_seconds == 0 { 0.5 } else { 0.15 },
                    self.beep_volume,
                ) {
                    error!("failed to play beep: {err:?}");
                }
            }
        }
        self.remaining_seconds = remaining_seconds;
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}

fn play_beep(
    audio_context: &web_sys::AudioContext,
    frequency: f32,
    start: f64,
    length: f64,
    volume: u8,
) -> Result<(), web_sys::wasm_bindgen::JsValue> {
    let oscillator = audio_context.create_oscillator()?;
    let gain = audio_context.create_gain()?;
    gain.gain().set_value(f32::from(volume) / 100.);
    gain.connect_with_audio_node(&audio_context.destination())?;
    oscillator.connect_with_audio_node(&gain)?;
    oscillator.frequency().set_value(frequency);
    oscillator.start_with_when(start)?;
    oscillator.stop_with_when(start + length)?;
    Ok(())
}
