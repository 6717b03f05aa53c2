use anyhow::{anyhow, bail, Context, Result};
use glam::{Vec3, Vec4};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::light::{Cone, LightKind, LightSource};
use crate::material::SurfaceMaterial;

/// Runtime representation of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<LightSource>,
    pub camera: Camera,
}

impl Scene {
    /// Parses a scene description.
    ///
    /// Every `<object>` becomes a [`SceneObject`]; objects of type `light`
    /// also contribute a [`LightSource`] and the first `camera` object sets
    /// the camera.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();
        let mut lights = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "mesh".to_string());
            object.mesh = optional_text(&node, "mesh");
            object.color = parse_color(optional_text(&node, "color"), object.color)?;
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)?;
            object.fov = parse_f32(optional_text(&node, "fov"), object.fov)?;
            object.intensity = parse_f32(optional_text(&node, "intensity"), object.intensity)?;

            match object.object_type.as_str() {
                "light" => {
                    let light = parse_light(&node, &object)
                        .with_context(|| format!("invalid light `{}`", object.name))?;
                    lights.push(light);
                }
                "mesh" => {
                    object.material = parse_material(&node, object.color)
                        .with_context(|| format!("invalid material on `{}`", object.name))?;
                }
                _ => {}
            }
            objects.push(object);
        }

        let camera = Camera::from_objects(&objects);
        Ok(Self {
            objects,
            lights,
            camera,
        })
    }

    /// The hit-test demo: a red sphere and a green cube lit by a sun and a
    /// dim ambient light.
    pub fn demo() -> Self {
        let sphere = SceneObject {
            name: "sun".into(),
            object_type: "mesh".into(),
            mesh: Some("sphere".into()),
            material: SurfaceMaterial::red_sphere(),
            ..SceneObject::default()
        };
        let cube = SceneObject {
            name: "cube".into(),
            object_type: "mesh".into(),
            mesh: Some("cube".into()),
            position: Vec3::new(-1.5, 0.5, 0.0),
            rotation: Vec3::new(0.0, 45.0, 0.0),
            material: SurfaceMaterial::green_cube(),
            ..SceneObject::default()
        };
        Self {
            objects: vec![sphere, cube],
            lights: vec![LightSource::sunlight(), LightSource::ambient()],
            camera: Camera::default(),
        }
    }

    /// Objects that produce a draw call.
    pub fn meshes(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.object_type == "mesh")
    }
}

/// Scene object as described by the authoring tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub material: SurfaceMaterial,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            mesh: None,
            color: default_color(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            fov: default_fov(),
            intensity: default_intensity(),
            material: SurfaceMaterial::default(),
        }
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_fov() -> f32 {
    70.0
}

fn default_intensity() -> f32 {
    1.0
}

fn parse_light(node: &Node<'_, '_>, object: &SceneObject) -> Result<LightSource> {
    let defaults = LightSource::default();
    let specular_color = parse_color(
        optional_text(node, "specularColor"),
        defaults.specular_color,
    )?;
    let attenuation = parse_vec3(optional_text(node, "attenuation"), Vec3::new(1.0, 0.0, 0.0))?;
    let kind = match optional_text(node, "lightType").as_deref().unwrap_or("sun") {
        "sun" => LightKind::Sun {
            position: object.position,
        },
        "point" => LightKind::Point {
            position: object.position,
            attenuation,
        },
        "spot" => LightKind::Spot {
            position: object.position,
            attenuation,
            cone: Cone {
                angle: parse_f32(optional_text(node, "coneAngle"), 40.0)?.to_radians(),
                direction: parse_vec3(optional_text(node, "coneDirection"), Vec3::NEG_Z)?,
                attenuation: parse_f32(optional_text(node, "coneAttenuation"), 12.0)?,
            },
        },
        "ambient" => LightKind::Ambient,
        other => bail!("unknown light type `{other}`"),
    };
    Ok(LightSource {
        color: object.color,
        specular_color,
        intensity: object.intensity,
        kind,
    })
}

fn parse_material(node: &Node<'_, '_>, base_color: Vec3) -> Result<SurfaceMaterial> {
    let defaults = SurfaceMaterial::default();
    Ok(SurfaceMaterial {
        base_color,
        second_color: parse_color(optional_text(node, "secondColor"), defaults.second_color)?,
        specular_color: parse_color(
            optional_text(node, "specularColor"),
            defaults.specular_color,
        )?,
        roughness: parse_f32(optional_text(node, "roughness"), defaults.roughness)?,
        metallic: parse_f32(optional_text(node, "metallic"), defaults.metallic)?,
        ambient_occlusion: parse_vec3(
            optional_text(node, "ambientOcclusion"),
            defaults.ambient_occlusion,
        )?,
        shininess: parse_f32(optional_text(node, "shininess"), defaults.shininess)?,
        irradiated_color: parse_rgba(
            optional_text(node, "irradiatedColor"),
            defaults.irradiated_color,
        )?,
    })
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components<const N: usize>(value: &str, what: &str) -> Result<[f32; N]> {
    let mut numbers = value.split_whitespace().map(|component| {
        component
            .parse::<f32>()
            .map_err(|err| anyhow!("invalid {what} component `{component}`: {err}"))
    });
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        *slot = numbers
            .next()
            .ok_or_else(|| anyhow!("{what} is missing components"))??;
    }
    Ok(out)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from_array(parse_components(&value, "vector")?))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from_array(parse_components(&value, "color")?) / 255.0)
}

fn parse_rgba(value: Option<String>, default: Vec4) -> Result<Vec4> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec4::from_array(parse_components(&value, "color")?) / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}
