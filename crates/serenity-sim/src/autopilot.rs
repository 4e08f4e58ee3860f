use serenity_core::input::InputFrame;

/// Scripted input for unattended runs: hold a move direction, hop on a fixed
/// cadence and tap buttons on chosen frames.
#[derive(Debug, Clone)]
pub struct Autopilot {
    frame: u32,
    axis: f32,
    /// Hop every N frames; 0 never jumps.
    jump_every: u32,
    ability_at: Vec<u32>,
    effect_at: Vec<u32>,
}

impl Autopilot {
    pub fn new(axis: f32, jump_every: u32) -> Self {
        Self {
            frame: 0,
            axis,
            jump_every,
            ability_at: Vec::new(),
            effect_at: Vec::new(),
        }
    }

    /// Run right through the bundled meadow level, using the transparency
    /// grant over the cloud gap and dashing once past the crocodile.
    pub fn meadow() -> Self {
        Self::new(1.0, 50)
            .tap_ability(150)
            .tap_ability(190)
            .tap_effect(200)
    }

    pub fn tap_ability(mut self, frame: u32) -> Self {
        self.ability_at.push(frame);
        self
    }

    pub fn tap_effect(mut self, frame: u32) -> Self {
        self.effect_at.push(frame);
        self
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn next_input(&mut self) -> InputFrame {
        let frame = self.frame;
        self.frame += 1;
        InputFrame {
            move_axis: self.axis,
            jump: self.jump_every > 0 && frame > 0 && frame % self.jump_every == 0,
            use_ability: self.ability_at.contains(&frame),
            effect: self.effect_at.contains(&frame),
            ..Default::default()
        }
    }
}
