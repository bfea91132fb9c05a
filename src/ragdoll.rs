//! The runner's figure: body-part and joint definition tables.
//!
//! All values are 1:1 with the original game. Positions and anchors are in
//! world metres, angles in radians. Enum order doubles as construction order
//! and as the observation layout, and the joint order matters: the solver is
//! order-sensitive, so joints must be created exactly in table order.

use serde::Serialize;

/// The twelve dynamic parts, in construction/observation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BodyPart {
    Torso,
    Head,
    LeftArm,
    LeftCalf,
    LeftFoot,
    LeftForearm,
    LeftThigh,
    RightArm,
    RightCalf,
    RightFoot,
    RightForearm,
    RightThigh,
}

impl BodyPart {
    pub const COUNT: usize = 12;

    pub const ALL: [BodyPart; Self::COUNT] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::LeftArm,
        BodyPart::LeftCalf,
        BodyPart::LeftFoot,
        BodyPart::LeftForearm,
        BodyPart::LeftThigh,
        BodyPart::RightArm,
        BodyPart::RightCalf,
        BodyPart::RightFoot,
        BodyPart::RightForearm,
        BodyPart::RightThigh,
    ];

    /// Tag string as the original game spells it.
    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Torso => "torso",
            BodyPart::Head => "head",
            BodyPart::LeftArm => "leftArm",
            BodyPart::LeftCalf => "leftCalf",
            BodyPart::LeftFoot => "leftFoot",
            BodyPart::LeftForearm => "leftForearm",
            BodyPart::LeftThigh => "leftThigh",
            BodyPart::RightArm => "rightArm",
            BodyPart::RightCalf => "rightCalf",
            BodyPart::RightFoot => "rightFoot",
            BodyPart::RightForearm => "rightForearm",
            BodyPart::RightThigh => "rightThigh",
        }
    }

    pub fn is_foot(self) -> bool {
        matches!(self, BodyPart::LeftFoot | BodyPart::RightFoot)
    }

    /// Parts whose ground contact counts as a fall. Torso, thighs and
    /// calves scraping the track are deliberately not falls.
    pub fn is_fall_part(self) -> bool {
        matches!(
            self,
            BodyPart::Head
                | BodyPart::LeftArm
                | BodyPart::RightArm
                | BodyPart::LeftForearm
                | BodyPart::RightForearm
        )
    }
}

/// The eleven hinges, in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JointId {
    Neck,
    RightShoulder,
    LeftShoulder,
    LeftHip,
    RightHip,
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointId {
    pub const COUNT: usize = 11;

    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Neck,
        JointId::RightShoulder,
        JointId::LeftShoulder,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JointId::Neck => "neck",
            JointId::RightShoulder => "rightShoulder",
            JointId::LeftShoulder => "leftShoulder",
            JointId::LeftHip => "leftHip",
            JointId::RightHip => "rightHip",
            JointId::LeftElbow => "leftElbow",
            JointId::RightElbow => "rightElbow",
            JointId::LeftKnee => "leftKnee",
            JointId::RightKnee => "rightKnee",
            JointId::LeftAnkle => "leftAnkle",
            JointId::RightAnkle => "rightAnkle",
        }
    }
}

/// Spawn placement and fixture data for one body part.
#[derive(Debug, Clone, Copy)]
pub struct PartDef {
    pub part: BodyPart,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub friction: f32,
    pub density: f32,
}

/// Definition of one revolute joint. Anchors are per-body world points at
/// spawn; they are converted to local anchors at construction time.
#[derive(Debug, Clone, Copy)]
pub struct JointDef {
    pub joint: JointId,
    pub body_a: BodyPart,
    pub body_b: BodyPart,
    pub anchor_a: [f32; 2],
    pub anchor_b: [f32; 2],
    pub lower_angle: f32,
    pub upper_angle: f32,
    pub reference_angle: f32,
    pub enable_motor: bool,
    pub max_motor_torque: f32,
}

/// Spawn table. Feet are heavier and grippier than everything else
/// (friction 1.5, density 3 vs 0.2 and 1).
pub const PART_DEFS: [PartDef; BodyPart::COUNT] = [
    PartDef { part: BodyPart::Torso,        x: 2.511172622600016,  y: -1.870951753395794, angle: -1.251449711930133, half_width: 3.275, half_height: 1.425, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::Head,         x: 3.888130278719558,  y: -5.621802929095265, angle: 0.064484158352251,  half_width: 1.075, half_height: 1.325, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::LeftArm,      x: 4.417861014480877,  y: -2.806563606410589, angle: 0.904009589527283,  half_width: 1.850, half_height: 0.625, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::LeftCalf,     x: 3.125857319740870,  y: 5.525511655361298,  angle: -1.590397152822527, half_width: 2.500, half_height: 0.750, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::LeftFoot,     x: 3.926921842806667,  y: 8.088840320496220,  angle: 0.120275246434088,  half_width: 1.350, half_height: 0.675, friction: 1.5, density: 3.0 },
    PartDef { part: BodyPart::LeftForearm,  x: 5.830008603424893,  y: -2.873353963115958, angle: -1.204977261842124, half_width: 1.750, half_height: 0.550, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::LeftThigh,    x: 2.564898762820388,  y: 1.648090668682522,  angle: -2.017723442682339, half_width: 2.525, half_height: 1.000, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::RightArm,     x: 1.181230366327285,  y: -3.500025651860101, angle: -0.522221740463439, half_width: 1.950, half_height: 0.750, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::RightCalf,    x: -0.072539057367905, y: 5.347881871063159,  angle: -0.758885996710445, half_width: 2.500, half_height: 0.750, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::RightFoot,    x: -1.125474264390871, y: 7.567193169625567,  angle: 0.589760541821960,  half_width: 1.350, half_height: 0.725, friction: 1.5, density: 3.0 },
    PartDef { part: BodyPart::RightForearm, x: 0.407820642079743,  y: -1.059995323308417, angle: -1.755335828385730, half_width: 2.225, half_height: 0.675, friction: 0.2, density: 1.0 },
    PartDef { part: BodyPart::RightThigh,   x: 1.612018613567877,  y: 2.061532056188152,  angle: 1.484942296452803,  half_width: 2.650, half_height: 1.000, friction: 0.2, density: 1.0 },
];

/// Joint table. Ankle motors are disabled; their 2000 torque ceiling is
/// written into the joint anyway to match the original construction.
pub const JOINT_DEFS: [JointDef; JointId::COUNT] = [
    JointDef { joint: JointId::Neck,          body_a: BodyPart::Head,         body_b: BodyPart::Torso,      anchor_a: [3.5885141908, -4.5262242236],  anchor_b: [3.5887333416, -4.5264346585],  lower_angle: -0.5, upper_angle: 0.0, reference_angle: -1.308996406363529, enable_motor: false, max_motor_torque: 0.0 },
    JointDef { joint: JointId::RightShoulder, body_a: BodyPart::RightArm,     body_b: BodyPart::Torso,      anchor_a: [2.2284768218, -4.0864687322],  anchor_b: [2.2289299939, -4.0870755594],  lower_angle: -0.5, upper_angle: 1.5, reference_angle: -0.785390706546396, enable_motor: true,  max_motor_torque: 1000.0 },
    JointDef { joint: JointId::LeftShoulder,  body_a: BodyPart::LeftArm,      body_b: BodyPart::Torso,      anchor_a: [3.6241979857, -3.5334881618],  anchor_b: [3.6241778782, -3.5339504345],  lower_angle: -2.0, upper_angle: 0.0, reference_angle: -2.094383118168290, enable_motor: true,  max_motor_torque: 1000.0 },
    JointDef { joint: JointId::LeftHip,       body_a: BodyPart::LeftThigh,    body_b: BodyPart::Torso,      anchor_a: [2.0030339754, 0.2373716062],   anchor_b: [2.0033671814, 0.2380259039],   lower_angle: -1.5, upper_angle: 0.5, reference_angle: 0.725847750894404,  enable_motor: true,  max_motor_torque: 6000.0 },
    JointDef { joint: JointId::RightHip,      body_a: BodyPart::RightThigh,   body_b: BodyPart::Torso,      anchor_a: [1.2475900729, -0.0110466429],  anchor_b: [1.2470052824, -0.0116353472],  lower_angle: -1.3, upper_angle: 0.7, reference_angle: -2.719359381718199, enable_motor: true,  max_motor_torque: 6000.0 },
    JointDef { joint: JointId::LeftElbow,     body_a: BodyPart::LeftForearm,  body_b: BodyPart::LeftArm,    anchor_a: [5.5253753328, -1.6385620493],  anchor_b: [5.5253753295, -1.6385620366],  lower_angle: -0.1, upper_angle: 0.5, reference_angle: 2.094383118168290,  enable_motor: false, max_motor_torque: 0.0 },
    JointDef { joint: JointId::RightElbow,    body_a: BodyPart::RightForearm, body_b: BodyPart::RightArm,   anchor_a: [-0.0060908591, -2.8004758839], anchor_b: [-0.0060908612, -2.8004758929], lower_angle: -0.1, upper_angle: 0.5, reference_angle: 1.296819901227469,  enable_motor: false, max_motor_torque: 0.0 },
    JointDef { joint: JointId::LeftKnee,      body_a: BodyPart::LeftCalf,     body_b: BodyPart::LeftThigh,  anchor_a: [3.3843234120, 3.5168931241],   anchor_b: [3.3844684377, 3.5174122998],   lower_angle: -1.6, upper_angle: 0.0, reference_angle: -0.395311376411983, enable_motor: true,  max_motor_torque: 3000.0 },
    JointDef { joint: JointId::RightKnee,     body_a: BodyPart::RightCalf,    body_b: BodyPart::RightThigh, anchor_a: [1.4982369235, 4.1756003060],   anchor_b: [1.4982043533, 4.1749352067],   lower_angle: -1.3, upper_angle: 0.3, reference_angle: 2.289340624715868,  enable_motor: true,  max_motor_torque: 3000.0 },
    JointDef { joint: JointId::LeftAnkle,     body_a: BodyPart::LeftFoot,     body_b: BodyPart::LeftCalf,   anchor_a: [3.3123225078, 7.9477048539],   anchor_b: [3.3123224825, 7.9477048363],   lower_angle: -0.5, upper_angle: 0.5, reference_angle: -1.724432758501023, enable_motor: false, max_motor_torque: 2000.0 },
    JointDef { joint: JointId::RightAnkle,    body_a: BodyPart::RightFoot,    body_b: BodyPart::RightCalf,  anchor_a: [-1.6562855402, 6.9615514526],  anchor_b: [-1.6557266705, 6.9614938270],  lower_angle: -0.5, upper_angle: 0.5, reference_angle: -1.570804582594276, enable_motor: false, max_motor_torque: 2000.0 },
];
