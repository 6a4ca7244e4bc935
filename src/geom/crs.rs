use std::fmt;

use crate::error::TilingError;

/// Coordinate reference systems the reprojection layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326 lon/lat.
    Wgs84,
    /// EPSG:4269 lon/lat.
    Nad83,
    /// EPSG:4258 ETRS89 lon/lat.
    Etrs89,
    /// EPSG:3857 spherical Mercator, meters.
    WebMercator,
    /// WGS84 UTM zone (EPSG:326zz north, 327zz south), meters.
    Utm { zone: u8, south: bool },
    /// ETRS89 UTM zone (EPSG:258zz, zones 28 to 38), meters.
    EtrsUtm { zone: u8 },
}

impl Crs {
    /// Look up a CRS by EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, TilingError> {
        match code {
            4326 => Ok(Crs::Wgs84),
            4269 => Ok(Crs::Nad83),
            4258 => Ok(Crs::Etrs89),
            3857 | 900913 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm { zone: (code - 32600) as u8, south: false }),
            32701..=32760 => Ok(Crs::Utm { zone: (code - 32700) as u8, south: true }),
            25828..=25838 => Ok(Crs::EtrsUtm { zone: (code - 25800) as u8 }),
            _ => Err(TilingError::UnsupportedCrs(code)),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::Nad83 => 4269,
            Crs::Etrs89 => 4258,
            Crs::WebMercator => 3857,
            Crs::Utm { zone, south: false } => 32600 + *zone as u32,
            Crs::Utm { zone, south: true } => 32700 + *zone as u32,
            Crs::EtrsUtm { zone } => 25800 + *zone as u32,
        }
    }

    /// True for angular (lon/lat) systems.
    pub fn is_geographic(&self) -> bool { matches!(self, Crs::Wgs84 | Crs::Nad83 | Crs::Etrs89) }

    /// The UTM zone containing a lon/lat point.
    pub fn utm_containing(lon: f64, lat: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        Crs::Utm { zone, south: lat < 0.0 }
    }

    /// PROJ.4 definition string.
    pub(crate) fn proj4(&self) -> String {
        match self {
            Crs::Wgs84 => "+proj=longlat +datum=WGS84 +no_defs +type=crs".to_string(),
            Crs::Nad83 => "+proj=longlat +datum=NAD83 +no_defs +type=crs".to_string(),
            Crs::Etrs89 => "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs +type=crs".to_string(),
            // Sphere without a datum, so no ellipsoid shift is applied from WGS84.
            Crs::WebMercator => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 \
                +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs".to_string(),
            Crs::Utm { zone, south } => {
                let south = if *south { " +south" } else { "" };
                format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
            }
            Crs::EtrsUtm { zone } => {
                format!("+proj=utm +zone={zone} +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs +type=crs")
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "EPSG:{}", self.epsg()) }
}
