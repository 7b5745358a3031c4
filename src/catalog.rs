//! The fixed COCO class catalog.
//!
//! Index 0 is the `BG` background sentinel and never corresponds to a real
//! detection. The table is the process-wide source of truth for name/id
//! mapping; detector backends report class ids that index into it.

/// Class names in model output order. 80 real classes plus the sentinel.
pub const CLASS_NAMES: [&str; 81] = [
    "BG", "person", "bicycle", "car", "motorcycle", "airplane", "bus",
    "train", "truck", "boat", "traffic light", "fire hydrant", "stop sign",
    "parking meter", "bench", "bird", "cat", "dog", "horse", "sheep", "cow",
    "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella", "handbag",
    "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard",
    "tennis racket", "bottle", "wine glass", "cup", "fork", "knife", "spoon",
    "bowl", "banana", "apple", "sandwich", "orange", "broccoli", "carrot",
    "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear",
    "hair drier", "toothbrush",
];

/// Case-sensitive exact lookup of a class name.
///
/// Returns `None` for unknown names, including `BG`: the sentinel is not a
/// selectable object class.
pub fn class_id(name: &str) -> Option<u32> {
    CLASS_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .filter(|&id| id != 0)
        .map(|id| id as u32)
}

/// Class name for a detector-reported id, if the id is in catalog range.
pub fn class_name(id: u32) -> Option<&'static str> {
    CLASS_NAMES.get(id as usize).copied()
}

/// One line per selectable class, for the `--names` listing.
pub fn listing() -> String {
    let mut out = String::new();
    for (id, name) in CLASS_NAMES.iter().enumerate().skip(1) {
        out.push_str(&format!("{id:>2}  {name}\n"));
    }
    out
}
