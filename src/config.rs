//! Processing options for remove.bg requests
//!
//! [`RemovalOptions`] is the caller-facing option set. Its enum-typed attributes are
//! kept as plain strings so they can be filled from any source (flags, JSON presets,
//! user input); [`RemovalOptions::validate`] turns them into a [`NormalizedOptions`]
//! with typed values and all documented defaults applied.

use crate::error::{RemoveBgError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default region of interest (the whole image)
pub const DEFAULT_ROI: &str = "0 0 100% 100%";

/// Default foreground position
pub const DEFAULT_POSITION: &str = "original";

/// Default output file name
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "no-bg.png";

/// Declares a closed set of wire values for one option field.
///
/// Generates the enum plus `ALL`, `FIELD`, `as_str`, `parse_or_default`,
/// `Default`, `Display` and `FromStr`.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal, default = $default:ident,
        { $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every allowed value, in wire order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Option name used in validation errors
            pub const FIELD: &'static str = $field;

            /// Wire representation
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Parse a raw option value, mapping the empty string to the default
            pub fn parse_or_default(value: &str) -> Result<Self> {
                if value.is_empty() {
                    return Ok(Self::default());
                }
                value.parse()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RemoveBgError;

            fn from_str(value: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == value)
                    .ok_or_else(|| RemoveBgError::invalid_option(Self::FIELD, value, Self::ALL))
            }
        }
    };
}

option_enum! {
    /// Output resolution requested from the service
    ImageSize, field = "size", default = Regular, {
        /// Highest available resolution
        Auto => "auto",
        Preview => "preview",
        Small => "small",
        /// 0.25 megapixels
        Regular => "regular",
        /// 1.5 megapixels
        Medium => "medium",
        /// 4 megapixels
        Hd => "hd",
        /// Original size
        Full => "full",
        FourK => "4k",
    }
}

option_enum! {
    /// Kind of foreground object to keep
    ForegroundType, field = "type", default = Auto, {
        Auto => "auto",
        Person => "person",
        Product => "product",
        Animal => "animal",
        Car => "car",
        CarInterior => "car_interior",
        CarPart => "car_part",
        Transportation => "transportation",
        Graphics => "graphics",
        Other => "other",
    }
}

option_enum! {
    /// Classification level of the detected foreground
    TypeLevel, field = "type_level", default = None, {
        None => "none",
        Latest => "latest",
        /// Coarse classification (e.g. `car`)
        Coarse => "1",
        /// Specific classification (e.g. `car_interior`)
        Specific => "2",
    }
}

option_enum! {
    /// Encoding of the returned image
    OutputFormat, field = "format", default = Auto, {
        Auto => "auto",
        Png => "png",
        Jpg => "jpg",
        /// PNG color image and alpha matte packed into one archive
        Zip => "zip",
    }
}

option_enum! {
    /// Whether the finalized image or only its alpha mask is returned
    Channels, field = "channels", default = Rgba, {
        Rgba => "rgba",
        Alpha => "alpha",
    }
}

option_enum! {
    /// How the `background` option value is interpreted
    BackgroundKind, field = "background_kind", default = Unset, {
        Unset => "unset",
        /// Local image file composited behind the foreground
        Path => "path",
        /// Remote image composited behind the foreground
        Url => "url",
        /// Hex code (`81d4fa`, `fff`) or color name (`green`)
        Color => "color",
    }
}

/// Replacement background resolved from `background` + `background_kind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// Keep the result transparent
    None,
    Path(PathBuf),
    Url(String),
    Color(String),
}

fn deserialize_background_kind<'de, D>(deserializer: D) -> std::result::Result<BackgroundKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    BackgroundKind::parse_or_default(&raw).map_err(serde::de::Error::custom)
}

/// Caller-facing option set for a removal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalOptions {
    /// One of [`ImageSize`]; empty means `regular`
    pub size: String,

    /// One of [`ForegroundType`]; empty means `auto`
    pub foreground_type: String,

    /// One of [`TypeLevel`]; empty means `none`
    pub type_level: String,

    /// One of [`OutputFormat`]; empty means `auto`
    pub format: String,

    /// Region of interest `x1 y1 x2 y2`, in px or relative (%)
    pub roi: String,

    /// Crop margin; a non-empty value turns cropping on
    pub crop_margin: String,

    /// Foreground scale relative to the total image size
    pub scale: String,

    /// `center`, `original`, or one/two relative values
    pub position: String,

    /// One of [`Channels`]; empty means `rgba`
    pub channels: String,

    /// Add an artificial shadow (not supported for every foreground type)
    pub add_shadow: bool,

    /// Keep semi-transparent regions such as windows or glass
    pub semitransparency: bool,

    /// Background path, URL or color, interpreted according to `background_kind`
    pub background: String,

    /// Empty string in a preset means `unset`
    #[serde(deserialize_with = "deserialize_background_kind")]
    pub background_kind: BackgroundKind,

    /// Where the processed image is written
    pub output_file_name: String,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            size: ImageSize::default().to_string(),
            foreground_type: ForegroundType::default().to_string(),
            type_level: TypeLevel::default().to_string(),
            format: OutputFormat::default().to_string(),
            roi: DEFAULT_ROI.to_string(),
            crop_margin: String::new(),
            scale: String::new(),
            position: DEFAULT_POSITION.to_string(),
            channels: Channels::default().to_string(),
            add_shadow: false,
            semitransparency: true,
            background: String::new(),
            background_kind: BackgroundKind::Unset,
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
        }
    }
}

impl RemovalOptions {
    /// Option set with every documented default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for fluent option construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use removebg::{ImageSize, ForegroundType, RemovalOptions};
    ///
    /// let options = RemovalOptions::builder()
    ///     .size(ImageSize::Hd)
    ///     .foreground_type(ForegroundType::Product)
    ///     .crop_margin("10%")
    ///     .background_color("81d4fa")
    ///     .output_file_name("product.png")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(options.size, "hd");
    /// ```
    #[must_use]
    pub fn builder() -> RemovalOptionsBuilder {
        RemovalOptionsBuilder::default()
    }

    /// Validate the option set and produce its normalized form
    ///
    /// Empty enum-typed values are replaced by their defaults, as are empty
    /// `roi`, `position` and `output_file_name`. `scale`, `crop_margin` and
    /// `background` pass through untouched.
    ///
    /// # Errors
    /// - `InvalidOption` naming the first offending field, checked in the order
    ///   size, type, type_level, format, channels
    ///
    /// # Examples
    ///
    /// ```rust
    /// use removebg::{ImageSize, RemovalOptions};
    ///
    /// let mut options = RemovalOptions::default();
    /// options.size = String::new();
    /// assert_eq!(options.validate().unwrap().size, ImageSize::Regular);
    ///
    /// options.size = "huge".to_string();
    /// assert!(options.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<NormalizedOptions> {
        self.normalized().map_err(|e| {
            tracing::warn!(error = %e, "Rejected removal options");
            e
        })
    }

    fn normalized(&self) -> Result<NormalizedOptions> {
        let size = ImageSize::parse_or_default(&self.size)?;
        let foreground_type = ForegroundType::parse_or_default(&self.foreground_type)?;
        let type_level = TypeLevel::parse_or_default(&self.type_level)?;
        let format = OutputFormat::parse_or_default(&self.format)?;
        let channels = Channels::parse_or_default(&self.channels)?;

        let background = match self.background_kind {
            BackgroundKind::Unset => Background::None,
            BackgroundKind::Path => Background::Path(PathBuf::from(&self.background)),
            BackgroundKind::Url => Background::Url(self.background.clone()),
            BackgroundKind::Color => Background::Color(self.background.clone()),
        };

        Ok(NormalizedOptions {
            size,
            foreground_type,
            type_level,
            format,
            roi: or_default(&self.roi, DEFAULT_ROI),
            crop_margin: self.crop_margin.clone(),
            scale: self.scale.clone(),
            position: or_default(&self.position, DEFAULT_POSITION),
            channels,
            add_shadow: self.add_shadow,
            semitransparency: self.semitransparency,
            background,
            output_path: PathBuf::from(or_default(
                &self.output_file_name,
                DEFAULT_OUTPUT_FILE_NAME,
            )),
        })
    }

    /// Validate and write the normalized values back into this option set
    ///
    /// # Errors
    /// - `InvalidOption` as for [`RemovalOptions::validate`]; the option set is
    ///   left unchanged on failure
    pub fn normalize(&mut self) -> Result<()> {
        let normalized = self.validate()?;
        self.size = normalized.size.to_string();
        self.foreground_type = normalized.foreground_type.to_string();
        self.type_level = normalized.type_level.to_string();
        self.format = normalized.format.to_string();
        self.channels = normalized.channels.to_string();
        self.roi = normalized.roi;
        self.position = normalized.position;
        self.output_file_name = normalized.output_path.to_string_lossy().into_owned();
        Ok(())
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Option set after validation: typed values, defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub size: ImageSize,
    pub foreground_type: ForegroundType,
    pub type_level: TypeLevel,
    pub format: OutputFormat,
    pub roi: String,
    pub crop_margin: String,
    pub scale: String,
    pub position: String,
    pub channels: Channels,
    pub add_shadow: bool,
    pub semitransparency: bool,
    pub background: Background,
    pub output_path: PathBuf,
}

impl NormalizedOptions {
    /// Cropping is requested whenever a crop margin is present
    #[must_use]
    pub fn crop_enabled(&self) -> bool {
        !self.crop_margin.is_empty()
    }
}

/// Builder for `RemovalOptions`
#[derive(Debug, Default)]
pub struct RemovalOptionsBuilder {
    options: RemovalOptions,
}

impl RemovalOptionsBuilder {
    /// Set output size
    #[must_use]
    pub fn size(mut self, size: ImageSize) -> Self {
        self.options.size = size.to_string();
        self
    }

    /// Set foreground type
    #[must_use]
    pub fn foreground_type(mut self, foreground_type: ForegroundType) -> Self {
        self.options.foreground_type = foreground_type.to_string();
        self
    }

    /// Set classification level
    #[must_use]
    pub fn type_level(mut self, type_level: TypeLevel) -> Self {
        self.options.type_level = type_level.to_string();
        self
    }

    /// Set output format
    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = format.to_string();
        self
    }

    /// Set region of interest
    #[must_use]
    pub fn roi<S: Into<String>>(mut self, roi: S) -> Self {
        self.options.roi = roi.into();
        self
    }

    /// Enable cropping with the given margin
    #[must_use]
    pub fn crop_margin<S: Into<String>>(mut self, margin: S) -> Self {
        self.options.crop_margin = margin.into();
        self
    }

    /// Set foreground scale
    #[must_use]
    pub fn scale<S: Into<String>>(mut self, scale: S) -> Self {
        self.options.scale = scale.into();
        self
    }

    /// Set foreground position
    #[must_use]
    pub fn position<S: Into<String>>(mut self, position: S) -> Self {
        self.options.position = position.into();
        self
    }

    /// Set output channels
    #[must_use]
    pub fn channels(mut self, channels: Channels) -> Self {
        self.options.channels = channels.to_string();
        self
    }

    /// Enable or disable the artificial shadow
    #[must_use]
    pub fn add_shadow(mut self, add_shadow: bool) -> Self {
        self.options.add_shadow = add_shadow;
        self
    }

    /// Enable or disable semi-transparency
    #[must_use]
    pub fn semitransparency(mut self, semitransparency: bool) -> Self {
        self.options.semitransparency = semitransparency;
        self
    }

    /// Composite the result onto a local image file
    #[must_use]
    pub fn background_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.background = path.into().to_string_lossy().into_owned();
        self.options.background_kind = BackgroundKind::Path;
        self
    }

    /// Composite the result onto a remote image
    #[must_use]
    pub fn background_url<S: Into<String>>(mut self, url: S) -> Self {
        self.options.background = url.into();
        self.options.background_kind = BackgroundKind::Url;
        self
    }

    /// Composite the result onto a solid color
    #[must_use]
    pub fn background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.options.background = color.into();
        self.options.background_kind = BackgroundKind::Color;
        self
    }

    /// Set where the processed image is written
    #[must_use]
    pub fn output_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.options.output_file_name = name.into();
        self
    }

    /// Build, validate and normalize the option set
    ///
    /// # Errors
    /// - `InvalidOption` if any enum-typed field holds an unknown value
    pub fn build(self) -> Result<RemovalOptions> {
        let mut options = self.options;
        options.normalize()?;
        Ok(options)
    }
}
