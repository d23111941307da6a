//! Gradient anchor tables, one `[index, r, g, b]` row per stop.

pub(crate) type Gradient = &'static [[u8; 4]];

pub(crate) const CANDY: Gradient = &[
    [0, 255, 166, 26],
    [63, 50, 26, 255],
    [127, 255, 26, 221],
    [191, 26, 52, 255],
    [252, 255, 166, 26],
];

pub(crate) const COOL: Gradient = &[[0, 0, 255, 255], [255, 255, 0, 255]];

pub(crate) const COSMIC_WAVES: Gradient = &[
    [0, 255, 26, 248],
    [54, 50, 26, 255],
    [127, 26, 255, 177],
    [206, 26, 52, 255],
    [255, 255, 26, 248],
];

pub(crate) const EARTH: Gradient = &[
    [0, 73, 156, 1],
    [51, 73, 156, 1],
    [51, 37, 138, 11],
    [102, 37, 138, 11],
    [102, 14, 119, 42],
    [153, 14, 119, 42],
    [153, 3, 103, 103],
    [204, 3, 103, 103],
    [204, 1, 87, 197],
    [255, 1, 87, 197],
];

pub(crate) const EBLOSSOM: Gradient = &[
    [0, 255, 26, 248],
    [25, 42, 255, 19],
    [51, 255, 26, 248],
    [76, 42, 255, 19],
    [102, 255, 26, 248],
    [127, 42, 255, 19],
    [153, 255, 26, 248],
    [178, 42, 255, 19],
    [204, 255, 26, 248],
    [229, 42, 255, 19],
    [255, 255, 26, 248],
];

pub(crate) const EMERALD: Gradient = &[
    [0, 2, 115, 1],
    [63, 3, 210, 44],
    [127, 6, 87, 0],
    [191, 41, 102, 35],
    [252, 0, 236, 170],
];

pub(crate) const EVERGLOW: Gradient = &[
    [0, 167, 244, 89],
    [142, 167, 244, 89],
    [142, 92, 182, 26],
    [150, 92, 182, 26],
    [150, 66, 86, 14],
    [178, 66, 86, 14],
    [178, 46, 16, 13],
    [193, 46, 16, 13],
    [193, 34, 5, 9],
    [255, 34, 5, 9],
];

pub(crate) const FATBOY: Gradient = &[
    [0, 215, 74, 6],
    [30, 74, 22, 53],
    [61, 18, 6, 27],
    [96, 5, 36, 85],
    [114, 1, 8, 30],
    [140, 1, 8, 30],
    [158, 5, 36, 85],
    [193, 18, 6, 27],
    [224, 74, 22, 53],
    [255, 215, 74, 6],
];

pub(crate) const FIREICE: Gradient = &[
    [0, 80, 2, 1],
    [51, 206, 15, 1],
    [101, 242, 34, 1],
    [153, 16, 67, 128],
    [204, 2, 21, 69],
    [255, 1, 2, 4],
];

pub(crate) const FIREY_NIGHT: Gradient = &[
    [0, 247, 36, 36],
    [23, 134, 29, 253],
    [38, 253, 34, 34],
    [53, 103, 1, 8],
    [76, 252, 80, 65],
    [97, 235, 79, 242],
    [120, 255, 0, 0],
    [140, 119, 10, 242],
    [155, 254, 28, 32],
    [196, 232, 39, 39],
    [255, 167, 69, 252],
];

pub(crate) const FLAME: Gradient = &[
    [0, 252, 42, 1],
    [43, 217, 6, 1],
    [89, 213, 66, 1],
    [127, 3, 74, 1],
    [165, 213, 66, 1],
    [211, 217, 6, 1],
    [255, 252, 42, 1],
];

pub(crate) const HEART: Gradient = &[
    [0, 35, 73, 67],
    [30, 35, 73, 67],
    [30, 46, 41, 37],
    [48, 46, 41, 37],
    [48, 59, 18, 15],
    [73, 59, 18, 15],
    [73, 46, 4, 9],
    [124, 46, 4, 9],
    [124, 23, 6, 7],
    [255, 23, 6, 7],
];

pub(crate) const LAVA: Gradient = &[
    [0, 0, 0, 0],
    [46, 18, 0, 0],
    [96, 113, 0, 0],
    [108, 142, 3, 1],
    [119, 175, 17, 1],
    [146, 213, 44, 2],
    [174, 255, 82, 4],
    [188, 255, 115, 4],
    [202, 255, 156, 4],
    [218, 255, 203, 4],
    [234, 255, 255, 4],
    [244, 255, 255, 71],
    [255, 255, 255, 255],
];

pub(crate) const MEADOW: Gradient = &[
    [0, 12, 203, 163],
    [61, 0, 92, 49],
    [63, 0, 87, 44],
    [124, 58, 182, 51],
    [160, 124, 255, 57],
    [232, 131, 209, 10],
    [255, 147, 236, 0],
];

pub(crate) const MELONBALL: Gradient = &[
    [0, 152, 227, 85],
    [51, 152, 227, 85],
    [51, 215, 244, 106],
    [102, 215, 244, 106],
    [102, 255, 142, 56],
    [153, 255, 142, 56],
    [153, 255, 90, 45],
    [204, 255, 90, 45],
    [204, 229, 36, 62],
    [255, 229, 36, 62],
];

pub(crate) const NEBULA: Gradient = &[
    [0, 105, 0, 193],
    [25, 9, 15, 121],
    [51, 123, 8, 137],
    [76, 37, 49, 153],
    [102, 162, 34, 88],
    [255, 0, 245, 255],
];

pub(crate) const OASIS: Gradient = &[[0, 16, 91, 19], [51, 29, 237, 253], [255, 167, 69, 252]];

pub(crate) const PINKSPLASH: Gradient = &[
    [0, 142, 1, 16],
    [56, 224, 1, 27],
    [91, 199, 85, 85],
    [132, 252, 173, 164],
    [173, 199, 85, 85],
    [219, 224, 1, 27],
    [255, 142, 1, 16],
];

pub(crate) const R: Gradient = &[
    [0, 252, 22, 0],
    [42, 255, 100, 1],
    [53, 255, 244, 1],
    [99, 42, 191, 45],
    [119, 0, 144, 247],
    [186, 91, 1, 199],
    [219, 247, 1, 0],
    [255, 34, 255, 1],
];

pub(crate) const SOFIA: Gradient = &[
    [0, 0, 90, 120],
    [51, 0, 90, 120],
    [51, 5, 57, 55],
    [102, 5, 57, 55],
    [102, 35, 33, 18],
    [153, 35, 33, 18],
    [153, 107, 85, 3],
    [204, 107, 85, 3],
    [204, 234, 162, 0],
    [255, 234, 162, 0],
];

pub(crate) const SUNSET: Gradient = &[
    [0, 120, 0, 0],
    [22, 179, 22, 0],
    [51, 255, 104, 0],
    [85, 167, 22, 18],
    [135, 100, 0, 103],
    [198, 16, 0, 130],
    [255, 0, 0, 160],
];

pub(crate) const SUNSET_FUSION: Gradient = &[
    [0, 255, 26, 248],
    [63, 255, 208, 26],
    [127, 255, 26, 248],
    [191, 255, 208, 26],
    [255, 255, 26, 248],
];

pub(crate) const TROVE: Gradient = &[
    [0, 12, 23, 11],
    [12, 8, 52, 27],
    [25, 32, 142, 64],
    [38, 55, 68, 30],
    [51, 190, 135, 45],
    [63, 201, 175, 59],
    [76, 186, 80, 20],
    [89, 220, 79, 32],
    [101, 184, 33, 14],
    [114, 137, 16, 15],
    [127, 118, 20, 27],
    [140, 79, 16, 35],
    [153, 67, 8, 26],
    [165, 22, 9, 42],
    [178, 11, 3, 34],
    [191, 58, 31, 109],
    [204, 186, 49, 83],
    [216, 182, 25, 55],
    [229, 39, 90, 100],
    [242, 15, 81, 132],
    [255, 68, 135, 52],
];

pub(crate) const VIVID: Gradient = &[
    [0, 157, 247, 36],
    [51, 134, 29, 253],
    [76, 253, 34, 34],
    [255, 167, 69, 252],
];

pub(crate) const VELVET: Gradient = &[
    [0, 1, 79, 80],
    [51, 1, 79, 80],
    [51, 1, 62, 62],
    [102, 1, 62, 62],
    [102, 1, 43, 40],
    [153, 1, 43, 40],
    [153, 1, 27, 23],
    [204, 1, 27, 23],
    [204, 1, 13, 10],
    [255, 1, 13, 10],
];

pub(crate) const VGA: Gradient = &[
    [0, 255, 255, 255],
    [17, 120, 135, 123],
    [33, 255, 0, 0],
    [51, 255, 255, 0],
    [68, 0, 255, 0],
    [84, 0, 255, 255],
    [102, 0, 0, 255],
    [119, 255, 0, 255],
    [135, 0, 0, 0],
    [153, 41, 55, 44],
    [170, 41, 0, 0],
    [186, 41, 55, 0],
    [204, 0, 55, 0],
    [221, 0, 55, 44],
    [237, 0, 0, 44],
    [255, 41, 0, 44],
];

pub(crate) const WAVE: Gradient = &[
    [0, 0, 174, 196],
    [25, 255, 0, 254],
    [66, 0, 45, 177],
    [76, 219, 20, 20],
    [84, 0, 22, 255],
    [97, 0, 224, 255],
    [104, 255, 0, 254],
    [122, 6, 7, 245],
    [211, 2, 57, 252],
    [255, 0, 245, 255],
];

pub(crate) const ELECTRIC_DESERT: Gradient = &[
    [0, 255, 120, 0],
    [32, 255, 40, 120],
    [64, 120, 0, 255],
    [96, 0, 255, 200],
    [128, 255, 255, 0],
    [160, 255, 0, 100],
    [192, 0, 120, 255],
    [224, 255, 60, 0],
    [255, 255, 120, 0],
];

pub(crate) const PSYCHEDELIC_PLAYA: Gradient = &[
    [0, 255, 0, 255],
    [21, 0, 255, 0],
    [42, 255, 255, 0],
    [63, 0, 0, 255],
    [84, 255, 128, 0],
    [105, 128, 0, 255],
    [126, 0, 255, 128],
    [147, 255, 0, 128],
    [168, 128, 255, 0],
    [189, 0, 128, 255],
    [210, 255, 64, 192],
    [231, 64, 255, 64],
    [252, 192, 64, 255],
    [255, 255, 0, 255],
];

pub(crate) const BURNING_RAINBOW: Gradient = &[
    [0, 255, 0, 0],
    [36, 255, 165, 0],
    [72, 255, 255, 0],
    [108, 0, 255, 0],
    [144, 0, 0, 255],
    [180, 75, 0, 130],
    [216, 238, 130, 238],
    [255, 255, 0, 0],
];

pub(crate) const NEON_NIGHTS: Gradient = &[
    [0, 255, 0, 150],
    [32, 0, 255, 255],
    [64, 150, 0, 255],
    [96, 255, 255, 0],
    [128, 255, 50, 0],
    [160, 0, 255, 100],
    [192, 100, 100, 255],
    [224, 255, 0, 200],
    [255, 255, 0, 150],
];

pub(crate) const DESERT_STORM: Gradient = &[
    [0, 139, 69, 19],
    [32, 255, 215, 0],
    [64, 105, 105, 105],
    [96, 255, 255, 224],
    [128, 160, 82, 45],
    [160, 255, 140, 0],
    [192, 128, 128, 128],
    [224, 255, 215, 0],
    [255, 139, 69, 19],
];

pub(crate) const COSMIC_FIRE: Gradient = &[
    [0, 0, 0, 128],
    [25, 25, 25, 112],
    [50, 255, 69, 0],
    [75, 255, 140, 0],
    [100, 255, 215, 0],
    [125, 255, 255, 255],
    [150, 255, 215, 0],
    [175, 255, 140, 0],
    [200, 255, 69, 0],
    [225, 25, 25, 112],
    [255, 0, 0, 128],
];

pub(crate) const ALIEN_GLOW: Gradient = &[
    [0, 173, 255, 47],
    [42, 0, 255, 127],
    [84, 102, 205, 170],
    [126, 64, 224, 208],
    [168, 0, 191, 255],
    [210, 138, 43, 226],
    [255, 173, 255, 47],
];

pub(crate) const MOLTEN_METAL: Gradient = &[
    [0, 25, 25, 25],
    [32, 139, 0, 0],
    [64, 255, 69, 0],
    [96, 255, 140, 0],
    [128, 255, 215, 0],
    [160, 255, 255, 224],
    [192, 255, 255, 255],
    [224, 255, 215, 0],
    [255, 25, 25, 25],
];
