use std::{collections::HashMap, time::Duration};

use anyhow::{anyhow, Context, Error, Result};

pub const DEFAULT_CVARS: &[(&str, CVar)] = &[
    // #############################
    // NAVIGATION VARIABLES:
    // #############################
    (
        "g_speed",
        CVar {
            description: "Walking speed, in units per second.",
            value: CVarValue::F32(3.0),
        },
    ),
    (
        "g_eyeheight",
        CVar {
            description: "Height the viewpoint is pinned to, in units.",
            value: CVarValue::F32(1.6),
        },
    ),
    (
        "g_boundsmargin",
        CVar {
            description: "Distance kept from the outer walls of the scene, in units.",
            value: CVarValue::F32(0.5),
        },
    ),
    (
        "g_maxframedt",
        CVar {
            description: "Longest frame step the integrator will take, in milliseconds.",
            value: CVarValue::U32(100),
        },
    ),
    // #############################
    // INPUT VARIABLES:
    // #############################
    (
        "i_looksensitivity",
        CVar {
            description: "Radians of rotation per pixel of pointer drag.",
            value: CVarValue::F32(0.003),
        },
    ),
    (
        "i_touchlookscale",
        CVar {
            description: "Multiplier applied to the look sensitivity for touch drags.",
            value: CVarValue::F32(1.5),
        },
    ),
    (
        "i_touchlookarea",
        CVar {
            description: "Touches starting right of this fraction of the width look around.",
            value: CVarValue::F32(0.4),
        },
    ),
    // #############################
    // RENDERING VARIABLES:
    // #############################
    (
        "r_fov",
        CVar {
            description: "Vertical field of view, in degrees.",
            value: CVarValue::F32(75.0),
        },
    ),
    (
        "r_znear",
        CVar {
            description: "",
            value: CVarValue::F32(0.1),
        },
    ),
    (
        "r_zfar",
        CVar {
            description: "",
            value: CVarValue::F32(1000.0),
        },
    ),
    (
        "r_vsync",
        CVar {
            description: "Wait for the display refresh before presenting.",
            value: CVarValue::Bool(true),
        },
    ),
    // Number of MSAA samples.
    (
        "r_msaa",
        CVar {
            description: "",
            value: CVarValue::U32(4),
        },
    ),
];

pub type CVarsMap = HashMap<&'static str, CVar>;

pub fn default_cvars() -> CVarsMap {
    DEFAULT_CVARS.iter().copied().collect()
}

#[derive(Debug, Clone, Copy)]
pub struct CVar {
    pub description: &'static str,
    pub value: CVarValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CVarValue {
    Bool(bool),
    U32(u32),
    F32(f32),
}

impl CVarValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CVarValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            CVarValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            CVarValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn set_from_str(&mut self, value: &str) -> Result<(), Error> {
        match self {
            CVarValue::Bool(ref mut v) => *v = value.parse()?,
            CVarValue::U32(ref mut v) => *v = value.parse()?,
            CVarValue::F32(ref mut v) => *v = value.parse()?,
        };

        Ok(())
    }
}

/// Applies a `name=value` override, e.g. from the command line.
pub fn set_cvar(cvars: &mut CVarsMap, assignment: &str) -> Result<()> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected name=value, got {:?}", assignment))?;
    let name = name.trim();

    let cvar = cvars
        .get_mut(name)
        .ok_or_else(|| anyhow!("Unknown cvar {:?}", name))?;
    cvar.value
        .set_from_str(value.trim())
        .with_context(|| format!("Invalid value for {}", name))?;

    log::debug!("{} = {:?}", name, cvar.value);
    Ok(())
}

/// Applies every key of a JSON object as an override, e.g. `{"g_speed": 4.5}`.
pub fn apply_json_overrides(cvars: &mut CVarsMap, json: &str) -> Result<()> {
    let overrides: HashMap<String, serde_json::Value> =
        serde_json::from_str(json).context("cvar overrides must be a JSON object")?;

    for (name, value) in overrides {
        let value = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        set_cvar(cvars, &format!("{}={}", name, value))?;
    }

    Ok(())
}

/// Typed view of the cvars the controller and renderer read every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub walk_speed: f32,
    pub eye_height: f32,
    pub bounds_margin: f32,
    pub max_frame_dt: Duration,

    pub look_sensitivity: f32,
    pub touch_look_scale: f32,
    pub touch_look_area: f32,

    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub msaa: u32,
    pub vsync: bool,
}

fn _f32(cvars: &CVarsMap, name: &str) -> Result<f32> {
    cvars
        .get(name)
        .and_then(|cvar| cvar.value.as_f32())
        .ok_or_else(|| anyhow!("cvar {} is missing or not an f32", name))
}

fn _bool(cvars: &CVarsMap, name: &str) -> Result<bool> {
    cvars
        .get(name)
        .and_then(|cvar| cvar.value.as_bool())
        .ok_or_else(|| anyhow!("cvar {} is missing or not a bool", name))
}

fn _u32(cvars: &CVarsMap, name: &str) -> Result<u32> {
    cvars
        .get(name)
        .and_then(|cvar| cvar.value.as_u32())
        .ok_or_else(|| anyhow!("cvar {} is missing or not a u32", name))
}

impl Tuning {
    pub fn from_cvars(cvars: &CVarsMap) -> Result<Self> {
        Ok(Self {
            walk_speed: _f32(cvars, "g_speed")?,
            eye_height: _f32(cvars, "g_eyeheight")?,
            bounds_margin: _f32(cvars, "g_boundsmargin")?,
            max_frame_dt: Duration::from_millis(_u32(cvars, "g_maxframedt")? as u64),

            look_sensitivity: _f32(cvars, "i_looksensitivity")?,
            touch_look_scale: _f32(cvars, "i_touchlookscale")?,
            touch_look_area: _f32(cvars, "i_touchlookarea")?,

            fov: _f32(cvars, "r_fov")?,
            z_near: _f32(cvars, "r_znear")?,
            z_far: _f32(cvars, "r_zfar")?,
            msaa: _u32(cvars, "r_msaa")?,
            vsync: _bool(cvars, "r_vsync")?,
        })
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            eye_height: 1.6,
            bounds_margin: 0.5,
            max_frame_dt: Duration::from_millis(100),

            look_sensitivity: 0.003,
            touch_look_scale: 1.5,
            touch_look_area: 0.4,

            fov: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            msaa: 4,
            vsync: true,
        }
    }
}
