//! Keyframe animation playback.
//!
//! Clips hold per-node translation/rotation/scale channels. The mixer loops a
//! single clip and writes sampled values over the rest pose.

use glam::{Quat, Vec3};

use crate::model::NodeTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

/// Keyframe values for one animated property
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl ChannelValues {
    fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub node: usize,
    pub times: Vec<f32>,
    pub values: ChannelValues,
    pub interpolation: Interpolation,
}

impl Channel {
    /// Write this channel's value at `time` into `target`
    pub fn apply(&self, time: f32, target: &mut NodeTransform) {
        if self.times.is_empty() || self.values.len() < self.times.len() {
            return;
        }

        let (i0, i1, t) = keyframe_span(&self.times, time);
        let t = match self.interpolation {
            Interpolation::Step => 0.0,
            Interpolation::Linear => t,
        };

        match &self.values {
            ChannelValues::Translation(v) => target.translation = v[i0].lerp(v[i1], t),
            ChannelValues::Scale(v) => target.scale = v[i0].lerp(v[i1], t),
            ChannelValues::Rotation(v) => target.rotation = v[i0].slerp(v[i1], t).normalize(),
        }
    }
}

/// Keyframe pair surrounding `time` and the blend factor between them
pub fn keyframe_span(times: &[f32], time: f32) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if time <= times[0] {
        return (0, 0, 0.0);
    }
    if time >= times[last] {
        return (last, last, 0.0);
    }

    // First keyframe strictly after `time`
    let next = times.partition_point(|&k| k <= time);
    let prev = next - 1;
    let span = times[next] - times[prev];
    let t = if span > 0.0 {
        (time - times[prev]) / span
    } else {
        0.0
    };
    (prev, next, t)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    pub fn sample(&self, time: f32, pose: &mut [NodeTransform]) {
        for channel in &self.channels {
            if let Some(target) = pose.get_mut(channel.node) {
                channel.apply(time, target);
            }
        }
    }
}

/// Loops one clip and tracks its playhead
#[derive(Debug, Clone)]
pub struct AnimationMixer {
    clip: AnimationClip,
    time: f32,
}

impl AnimationMixer {
    pub fn new(clip: AnimationClip) -> Self {
        log::info!(
            "Playing animation '{}' ({:.2}s, {} channels)",
            clip.name,
            clip.duration,
            clip.channels.len()
        );
        Self { clip, time: 0.0 }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance the playhead by `delta` seconds, wrapping at the clip end
    pub fn update(&mut self, delta: f32) {
        if self.clip.duration <= 0.0 {
            return;
        }
        self.time = (self.time + delta.max(0.0)).rem_euclid(self.clip.duration);
    }

    /// Overwrite animated properties of `pose` at the current playhead
    pub fn apply(&self, pose: &mut [NodeTransform]) {
        self.clip.sample(self.time, pose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_clip() -> AnimationClip {
        AnimationClip::new(
            "slide",
            vec![Channel {
                node: 0,
                times: vec![0.0, 1.0, 2.0],
                values: ChannelValues::Translation(vec![
                    Vec3::ZERO,
                    Vec3::new(10.0, 0.0, 0.0),
                    Vec3::new(10.0, 10.0, 0.0),
                ]),
                interpolation: Interpolation::Linear,
            }],
        )
    }

    #[test]
    fn span_clamps_and_interpolates() {
        let times = [0.0, 1.0, 3.0];
        assert_eq!(keyframe_span(&times, -1.0), (0, 0, 0.0));
        assert_eq!(keyframe_span(&times, 0.5), (0, 1, 0.5));
        assert_eq!(keyframe_span(&times, 2.0), (1, 2, 0.5));
        assert_eq!(keyframe_span(&times, 1.0), (1, 2, 0.0));
        assert_eq!(keyframe_span(&times, 5.0), (2, 2, 0.0));
    }

    #[test]
    fn clip_duration_is_last_keyframe() {
        assert_eq!(slide_clip().duration, 2.0);
    }

    #[test]
    fn linear_translation_is_interpolated() {
        let clip = slide_clip();
        let mut pose = vec![NodeTransform::IDENTITY];
        clip.sample(0.25, &mut pose);
        assert!(pose[0].translation.abs_diff_eq(Vec3::new(2.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn step_holds_previous_value() {
        let mut clip = slide_clip();
        clip.channels[0].interpolation = Interpolation::Step;
        let mut pose = vec![NodeTransform::IDENTITY];
        clip.sample(0.9, &mut pose);
        assert_eq!(pose[0].translation, Vec3::ZERO);
    }

    #[test]
    fn mixer_loops_modulo_duration() {
        let mut mixer = AnimationMixer::new(slide_clip());
        mixer.update(1.5);
        mixer.update(1.0);
        assert!((mixer.time() - 0.5).abs() < 1e-6);

        let mut pose = vec![NodeTransform::IDENTITY];
        mixer.apply(&mut pose);
        assert!(pose[0].translation.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn rotation_uses_slerp() {
        let clip = AnimationClip::new(
            "spin",
            vec![Channel {
                node: 0,
                times: vec![0.0, 1.0],
                values: ChannelValues::Rotation(vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ]),
                interpolation: Interpolation::Linear,
            }],
        );
        let mut pose = vec![NodeTransform::IDENTITY];
        clip.sample(0.5, &mut pose);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(pose[0].rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn channels_for_missing_nodes_are_skipped() {
        let mut clip = slide_clip();
        clip.channels[0].node = 7;
        let mut pose = vec![NodeTransform::IDENTITY];
        clip.sample(1.0, &mut pose);
        assert_eq!(pose[0], NodeTransform::IDENTITY);
    }

    #[test]
    fn empty_clip_does_not_advance() {
        let mut mixer = AnimationMixer::new(AnimationClip::new("empty", vec![]));
        mixer.update(1.0);
        assert_eq!(mixer.time(), 0.0);
    }
}
