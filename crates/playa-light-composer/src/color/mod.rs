mod utils;

use smart_leds::RGB8;
use smart_leds::hsv::Hsv as HSV;

pub use utils::{BLACK, WHITE, blend_colors, hsv, rgb_from_u32};

pub type Rgb = RGB8;
pub type Hsv = HSV;
pub use smart_leds::hsv::hsv2rgb;
