use tutor_realtime_types::RawFrame;

/// Deterministic moving-gradient frame generator. Stands in for a real
/// camera in tests and demos; successive frames differ so consumers can
/// tell them apart.
pub struct TestPattern {
    width: u32,
    height: u32,
    tick: u8,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }

    pub fn next_frame(&mut self) -> RawFrame {
        self.tick = self.tick.wrapping_add(1);
        let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push((x as u8).wrapping_add(self.tick));
                pixels.push(y as u8);
                pixels.push(self.tick);
                pixels.push(255);
            }
        }
        RawFrame::new(self.width, self.height, pixels)
    }
}
