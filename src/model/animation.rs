/// A named animation clip and its length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

/// Playback state of one clip bound to the player.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    pub clip: AnimationClip,
    pub time: f32,
    pub paused: bool,
}

impl AnimationAction {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            paused: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.paused
    }

    fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.time += dt;
        if self.clip.duration > 0.0 {
            self.time = self.time.rem_euclid(self.clip.duration);
        }
    }
}

/// Drives the player's single looping action.
#[derive(Debug, Clone)]
pub struct AnimationMixer {
    action: AnimationAction,
    updates: u64,
}

impl AnimationMixer {
    /// Bind the first clip and start it playing.
    pub fn from_clips(clips: &[AnimationClip]) -> Option<Self> {
        let clip = clips.first()?.clone();
        Some(Self {
            action: AnimationAction::new(clip),
            updates: 0,
        })
    }

    pub fn update(&mut self, dt: f32) {
        self.action.advance(dt);
        self.updates += 1;
    }

    pub fn action(&self) -> &AnimationAction {
        &self.action
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.action.paused = paused;
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(duration: f32) -> AnimationClip {
        AnimationClip {
            name: "walk".to_string(),
            duration,
        }
    }

    #[test]
    fn no_clips_means_no_mixer() {
        assert!(AnimationMixer::from_clips(&[]).is_none());
    }

    #[test]
    fn first_clip_plays_and_loops() {
        let mut mixer = AnimationMixer::from_clips(&[walk(1.0), walk(5.0)]).unwrap();
        assert!(mixer.action().is_playing());
        assert_eq!(mixer.action().clip.duration, 1.0);

        for _ in 0..40 {
            mixer.update(0.03);
        }
        let t = mixer.action().time;
        assert!((t - 0.2).abs() < 1e-3, "time should wrap to 0.2, got {t}");
        assert_eq!(mixer.update_count(), 40);
    }

    #[test]
    fn paused_action_holds_its_time() {
        let mut mixer = AnimationMixer::from_clips(&[walk(2.0)]).unwrap();
        mixer.update(0.5);
        mixer.set_paused(true);
        mixer.update(0.5);
        assert_eq!(mixer.action().time, 0.5);
        mixer.set_paused(false);
        mixer.update(0.25);
        assert_eq!(mixer.action().time, 0.75);
    }
}
