//! Detection label tables
//!
//! Raw network labels (COCO) are mapped to the semantic object types
//! the danger logic understands, and each type carries a fixed safety
//! priority. Priority outranks raw confidence when picking the best
//! detection.

/// COCO dataset class names, in network output order.
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Raw label -> semantic object type. Anything unrecognized is an
/// obstacle: the safe assumption for a solid thing in the path.
pub fn object_type_for(label: &str) -> &'static str {
    match label {
        "person" => "person",
        "bicycle" | "car" | "motorcycle" | "airplane" | "bus" | "train" | "truck" | "boat" => {
            "vehicle"
        }
        "bird" | "cat" | "dog" | "horse" | "sheep" | "cow" | "elephant" | "bear" | "zebra"
        | "giraffe" => "animal",
        "traffic light" | "fire hydrant" | "stop sign" | "parking meter" => "landmark",
        _ => "obstacle",
    }
}

/// Safety priority per object type; the ranking key's first component.
pub fn priority_of(object_type: &str) -> u8 {
    match object_type {
        "person" => 10,
        "vehicle" => 9,
        "stairs" => 8,
        "animal" => 6,
        "door" => 5,
        "obstacle" => 4,
        "landmark" => 2,
        _ => 0,
    }
}
