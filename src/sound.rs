use std::{fmt, fs::File, io::BufReader, path::PathBuf, time::Duration};

use rodio::{source::SineWave, Decoder, Source};
use serde::{Deserialize, Serialize};

/// built-in alarm tones, synthesized so no sound files need to ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    ClassicBeep,
    DigitalAlarm,
    SoftChime,
}

impl Tone {
    pub const ALL: [Self; 3] = [Self::ClassicBeep, Self::DigitalAlarm, Self::SoftChime];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClassicBeep => "Classic Beep",
            Self::DigitalAlarm => "Digital Alarm",
            Self::SoftChime => "Soft Chime",
        }
    }

    /// one cycle of the tone; the audio worker loops it while the alarm rings
    fn source(self) -> Box<dyn Source + Send> {
        match self {
            Self::ClassicBeep => Box::new(
                SineWave::new(880.0)
                    .take_duration(Duration::from_millis(300))
                    .amplify(0.9)
                    .delay(Duration::from_millis(250)),
            ),
            Self::DigitalAlarm => Box::new(
                SineWave::new(1568.0)
                    .take_duration(Duration::from_millis(120))
                    .amplify(0.9)
                    .delay(Duration::from_millis(120)),
            ),
            Self::SoftChime => Box::new(
                SineWave::new(523.25)
                    .take_duration(Duration::from_millis(800))
                    .fade_in(Duration::from_millis(60))
                    .amplify(0.5)
                    .delay(Duration::from_millis(1200)),
            ),
        }
    }
}

/// where an alarm sound comes from: a built-in tone or a file the user picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundSource {
    Builtin(Tone),
    File(PathBuf),
}

/// a sound plus its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRef {
    pub name: String,
    pub source: SoundSource,
}

impl Default for SoundRef {
    fn default() -> Self {
        Self::builtin(Tone::default())
    }
}

impl fmt::Display for SoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            SoundSource::Builtin(_) => write!(f, "{}", self.name),
            // for files show the name and the path it resolves to
            SoundSource::File(path) => write!(f, "{} ({})", self.name, path.display()),
        }
    }
}

impl SoundRef {
    #[must_use]
    pub fn builtin(tone: Tone) -> Self {
        Self {
            name: tone.name().to_string(),
            source: SoundSource::Builtin(tone),
        }
    }

    /// a user-picked audio file, named after its file stem
    #[must_use]
    pub fn from_file(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map_or_else(|| "custom sound".to_string(), |s| s.to_string_lossy().into_owned());
        Self {
            name,
            source: SoundSource::File(path),
        }
    }
}

/// build the looping playback source for a sound. a file that can't be opened
/// or decoded falls back to the default tone so the alarm still makes noise.
#[must_use]
pub fn playback_source(sound: &SoundSource) -> Box<dyn Source + Send> {
    match sound {
        SoundSource::Builtin(tone) => tone.source(),
        SoundSource::File(path) => {
            let decoded = File::open(path)
                .map_err(|err| err.to_string())
                .and_then(|file| {
                    Decoder::new(BufReader::new(file)).map_err(|err| err.to_string())
                });
            match decoded {
                Ok(decoder) => Box::new(decoder),
                Err(err) => {
                    log::warn!(
                        "couldn't play {}: {err}; using {}",
                        path.display(),
                        Tone::default().name()
                    );
                    Tone::default().source()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_refs_are_named_after_the_stem() {
        let sound = SoundRef::from_file(PathBuf::from("/music/rooster-crow.mp3"));
        assert_eq!(sound.name, "rooster-crow");
    }

    #[test]
    fn default_is_the_classic_beep() {
        let sound = SoundRef::default();
        assert_eq!(sound.name, "Classic Beep");
        assert_eq!(sound.source, SoundSource::Builtin(Tone::ClassicBeep));
    }

    #[test]
    fn missing_file_falls_back_to_a_tone() {
        // must not panic, and must still yield an audible source
        let source = playback_source(&SoundSource::File(PathBuf::from("/does/not/exist.mp3")));
        assert!(source.sample_rate() > 0);
    }

    #[test]
    fn sound_ref_round_trips_through_json() {
        let sound = SoundRef::from_file(PathBuf::from("/music/waves.ogg"));
        let json = serde_json::to_string(&sound).unwrap();
        let back: SoundRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sound);
    }
}
