use std::fmt::{Debug, Formatter};

// Bit matrix
// Row major grid of modules, `true` is a dark module
//------------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
pub struct BitMatrix {
    w: u32,
    h: u32,
    bits: Vec<bool>,
}

impl BitMatrix {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h, bits: vec![false; (w as usize) * (h as usize)] }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    pub fn from_fn<F: FnMut(u32, u32) -> bool>(w: u32, h: u32, mut f: F) -> Self {
        let mut bits = Vec::with_capacity((w as usize) * (h as usize));
        for y in 0..h {
            for x in 0..w {
                bits.push(f(x, y));
            }
        }
        Self { w, h, bits }
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    pub fn height(&self) -> u32 {
        self.h
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.w && y < self.h, "({x}, {y}) outside {}x{}", self.w, self.h);
        (y as usize) * (self.w as usize) + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32) {
        let i = self.index(x, y);
        self.bits[i] = true;
    }

    // Sets every module of the rectangle, clipped to the matrix
    pub fn set_region(&mut self, left: u32, top: u32, w: u32, h: u32) {
        let right = left.saturating_add(w).min(self.w);
        let bottom = top.saturating_add(h).min(self.h);
        for y in top..bottom {
            for x in left..right {
                self.set(x, y);
            }
        }
    }

    pub fn flip(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = !*b);
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl Debug for BitMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.w, self.h)?;
        for row in self.bits.chunks(self.w.max(1) as usize) {
            let line: String = row.iter().map(|&b| if b { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
