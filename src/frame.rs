//! Frame-level state: image geometry, MCU layout, and the component table.

use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::misc::{ceil_div, FrameMode};

/// Everything derived from a single SOF0/SOF2 segment, plus the
/// quantization tables it binds and the coefficient storage every
/// subsequent scan writes into.
pub struct FrameState {
    pub mode: FrameMode,
    pub precision: u8,
    pub height: usize,
    pub width: usize,
    pub components: Vec<Component>,
    pub h_max: usize,
    pub v_max: usize,
    pub mcu_width: usize,
    pub mcu_height: usize,
    pub num_mcus_x: usize,
    pub num_mcus_y: usize,
}

impl FrameState {
    pub fn new(
        mode: FrameMode,
        precision: u8,
        height: usize,
        width: usize,
        mut components: Vec<Component>,
    ) -> Result<FrameState, DecodeErrors> {
        if height == 0 || width == 0 {
            return Err(DecodeErrors::ZeroSizeError);
        }

        let h_max = components.iter().map(|c| c.horizontal_sample).max().unwrap_or(1);
        let v_max = components.iter().map(|c| c.vertical_sample).max().unwrap_or(1);

        // T.81's own definition: the MCU spans `8*Hmax` pixels horizontally
        // and `8*Vmax` pixels vertically.
        let mcu_width = 8 * h_max;
        let mcu_height = 8 * v_max;

        let num_mcus_x = ceil_div(width, mcu_width);
        let num_mcus_y = ceil_div(height, mcu_height);

        for component in &mut components {
            component.allocate_coefficients(num_mcus_x, num_mcus_y);
        }

        Ok(FrameState {
            mode,
            precision,
            height,
            width,
            components,
            h_max,
            v_max,
            mcu_width,
            mcu_height,
            num_mcus_x,
            num_mcus_y,
        })
    }

    pub fn stuffed_width(&self) -> usize {
        self.num_mcus_x * self.mcu_width
    }

    pub fn stuffed_height(&self) -> usize {
        self.num_mcus_y * self.mcu_height
    }

    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}
