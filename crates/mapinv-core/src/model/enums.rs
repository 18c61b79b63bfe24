// ── Typed enumerations ──
//
// Each enumeration has two vocabularies: the lowercase local form used
// in the data file (serde) and the display label used by the Airtable
// single/multiple-select columns (`Display` / `FromStr` via strum).
// Both mappings are exhaustive; an unknown label fails to parse.

use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Parse a value written in the local (data file) vocabulary.
pub fn parse_local<'a, T: Deserialize<'a>>(value: &'a str) -> Option<T> {
    let deserializer: StrDeserializer<'a, ValueError> = value.into_deserializer();
    T::deserialize(deserializer).ok()
}

/// Technology/product a server runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    #[strum(serialize = "GeoServer")]
    Geoserver,
}

/// Technology/product backing a repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum RepositoryType {
    #[serde(rename = "postgis")]
    #[strum(serialize = "PostGIS")]
    Postgis,
    #[serde(rename = "geotiff")]
    #[strum(serialize = "GeoTiff")]
    Geotiff,
    #[serde(rename = "ecw")]
    #[strum(serialize = "ECW")]
    Ecw,
    #[serde(rename = "jp2ecw")]
    #[strum(serialize = "JPEG2000")]
    Jpeg2000,
    #[serde(rename = "imagemosaic")]
    #[strum(serialize = "Image Mosaic")]
    ImageMosaic,
    #[serde(rename = "worldimage")]
    #[strum(serialize = "World Image")]
    WorldImage,
}

/// Format a style is written in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    #[strum(serialize = "SLD")]
    Sld,
}

/// A layer's fundamental data type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[strum(serialize = "Raster")]
    Raster,
    #[strum(serialize = "Vector")]
    Vector,
}

/// Geometry of a vector layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum LayerGeometry {
    #[strum(serialize = "Point")]
    Point,
    #[strum(serialize = "Linestring")]
    Linestring,
    #[strum(serialize = "Polygon")]
    Polygon,
    #[strum(serialize = "Multi-Point")]
    MultiPoint,
    #[strum(serialize = "Multi-Linestring")]
    MultiLinestring,
    #[strum(serialize = "Multi-Polygon")]
    MultiPolygon,
}

/// OGC service a layer or layer group is published through.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    #[strum(serialize = "WMS")]
    Wms,
    #[strum(serialize = "WMTS")]
    Wmts,
    #[strum(serialize = "WCS")]
    Wcs,
    #[strum(serialize = "WFS")]
    Wfs,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn repository_labels_round_trip() {
        for kind in RepositoryType::iter() {
            let label = kind.to_string();
            assert_eq!(label.parse::<RepositoryType>().unwrap(), kind);
        }
        assert_eq!(RepositoryType::Jpeg2000.to_string(), "JPEG2000");
        assert_eq!(RepositoryType::ImageMosaic.to_string(), "Image Mosaic");
    }

    #[test]
    fn local_vocabulary_differs_from_labels() {
        assert_eq!(
            serde_json::to_string(&RepositoryType::Jpeg2000).unwrap(),
            "\"jp2ecw\""
        );
        assert_eq!(
            serde_json::to_string(&LayerGeometry::MultiPoint).unwrap(),
            "\"multi-point\""
        );
        assert_eq!(LayerGeometry::MultiPoint.to_string(), "Multi-Point");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!("postgis".parse::<RepositoryType>().is_err());
        assert!("Curve".parse::<LayerGeometry>().is_err());
        assert!("wms".parse::<Service>().is_err());
    }

    #[test]
    fn parse_local_uses_serde_names() {
        assert_eq!(
            parse_local::<RepositoryType>("imagemosaic"),
            Some(RepositoryType::ImageMosaic)
        );
        assert_eq!(parse_local::<Service>("wfs"), Some(Service::Wfs));
        assert_eq!(parse_local::<StyleType>("css"), None);
    }
}
