use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use super::{DataTable, ElementId, Row, TableError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineString(pub Vec<Point>);

impl LineString {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Planar length in coordinate units
    pub fn length(&self) -> f64 {
        self.0
            .windows(2)
            .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
            .sum()
    }
}

impl From<&[[f64; 2]]> for LineString {
    fn from(coords: &[[f64; 2]]) -> Self {
        Self(coords.iter().map(|&[x, y]| Point::new(x, y)).collect())
    }
}

/// Typed geometric payload attached to a geo table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", content = "coordinates")]
#[strum_discriminants(name(GeometryKind), derive(strum::Display, Serialize, Deserialize))]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        GeometryKind::from(self)
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Geometry::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_line_string(&self) -> Option<&LineString> {
        match self {
            Geometry::LineString(l) => Some(l),
            _ => None,
        }
    }

    /// Point from the `x`/`y` columns of a row
    pub fn point_from_xy(row: &Row<'_>) -> Result<Self, TableError> {
        Ok(Geometry::Point(Point::new(row.float("x")?, row.float("y")?)))
    }

    /// Line string from the `coords` column of a row
    pub fn line_from_coords(row: &Row<'_>) -> Result<Self, TableError> {
        Ok(Geometry::LineString(LineString::from(row.coords("coords")?)))
    }
}

/// A data table whose rows each carry a [`Geometry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoTable")]
pub struct GeoTable {
    data: DataTable,
    geometry: IndexMap<ElementId, Geometry>,
    crs: Option<String>,
}

/// Unchecked wire form of a [`GeoTable`]
#[derive(Deserialize)]
struct RawGeoTable {
    data: DataTable,
    geometry: IndexMap<ElementId, Geometry>,
    crs: Option<String>,
}

impl TryFrom<RawGeoTable> for GeoTable {
    type Error = TableError;

    fn try_from(raw: RawGeoTable) -> Result<Self, Self::Error> {
        if let Some(&index) = raw.geometry.keys().find(|&&i| !raw.data.contains(i)) {
            return Err(TableError::UnknownRow(index));
        }
        Ok(Self {
            data: raw.data,
            geometry: raw.geometry,
            crs: raw.crs,
        })
    }
}

impl GeoTable {
    /// Attach a geometry to every row of `data`
    pub fn from_table(
        data: DataTable,
        build: impl Fn(&Row<'_>) -> Result<Geometry, TableError>,
    ) -> Result<Self, TableError> {
        let geometry = data
            .rows()
            .map(|(index, row)| build(&row).map(|g| (index, g)))
            .collect::<Result<IndexMap<_, _>, _>>()?;

        Ok(Self {
            data,
            geometry,
            crs: None,
        })
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn data(&self) -> &DataTable {
        &self.data
    }

    /// Mutable row data; rows added here have no geometry until one is set.
    /// Use [`GeoTable::remove_row`] to delete rows, it drops the geometry too.
    pub fn data_mut(&mut self) -> &mut DataTable {
        &mut self.data
    }

    /// Remove a row together with its geometry
    pub fn remove_row(&mut self, index: ElementId) -> Result<(Vec<Value>, Option<Geometry>), TableError> {
        let cells = self.data.remove_row(index)?;
        Ok((cells, self.geometry.shift_remove(&index)))
    }

    pub fn geometry(&self, index: ElementId) -> Option<&Geometry> {
        self.geometry.get(&index)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (ElementId, &Geometry)> + '_ {
        self.geometry.iter().map(|(&index, g)| (index, g))
    }

    pub fn set_geometry(&mut self, index: ElementId, geometry: Geometry) -> Result<(), TableError> {
        if !self.data.contains(index) {
            return Err(TableError::UnknownRow(index));
        }
        self.geometry.insert(index, geometry);
        Ok(())
    }

    pub fn geometry_mut(&mut self, index: ElementId) -> Option<&mut Geometry> {
        self.geometry.get_mut(&index)
    }

    /// Drop the geometry, keeping only the row data
    pub fn into_data(self) -> DataTable {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geodata() -> DataTable {
        let mut table = DataTable::with_columns(&["x", "y", "coords"]);
        table
            .insert_row(0, [("x", 0.0.into()), ("y", 1.0.into())])
            .unwrap();
        table
            .insert_row(1, [("x", 3.0.into()), ("y", 5.0.into())])
            .unwrap();
        table
    }

    #[test]
    fn test_points_from_xy() {
        let geo = GeoTable::from_table(geodata(), Geometry::point_from_xy)
            .unwrap()
            .with_crs("EPSG:4326");

        assert_eq!(geo.crs(), Some("EPSG:4326"));
        assert_eq!(geo.geometry(1).unwrap().kind(), GeometryKind::Point);
        assert_eq!(geo.geometry(1).unwrap().as_point(), Some(&Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_missing_coords_fails() {
        // coords cells are null
        let err = GeoTable::from_table(geodata(), Geometry::line_from_coords).unwrap_err();
        assert!(matches!(err, TableError::WrongType { expected: "coords", .. }));
    }

    #[test]
    fn test_line_string_length() {
        let line = LineString::from(&[[0.0, 0.0], [3.0, 4.0], [3.0, 5.0]][..]);
        assert_eq!(line.length(), 6.0);
        assert_eq!(Geometry::LineString(line).kind().to_string(), "LineString");
    }

    #[test]
    fn test_set_geometry_on_unknown_row() {
        let mut geo = GeoTable::from_table(geodata(), Geometry::point_from_xy).unwrap();
        assert_eq!(
            geo.set_geometry(7, Geometry::Point(Point::new(0.0, 0.0))),
            Err(TableError::UnknownRow(7))
        );
    }

    #[test]
    fn test_remove_row_drops_geometry() {
        let mut geo = GeoTable::from_table(geodata(), Geometry::point_from_xy).unwrap();
        let (cells, geometry) = geo.remove_row(0).unwrap();

        assert_eq!(cells[0], Value::Float(0.0));
        assert_eq!(geometry, Some(Geometry::Point(Point::new(0.0, 1.0))));
        assert!(geo.geometry(0).is_none());
        assert_eq!(geo.geometries().count(), 1);
        assert_eq!(geo.remove_row(0).unwrap_err(), TableError::UnknownRow(0));
    }

    #[test]
    fn test_deserialize_rejects_orphan_geometry() {
        let geo = GeoTable::from_table(geodata(), Geometry::point_from_xy).unwrap();
        let mut json = serde_json::to_value(&geo).unwrap();

        let back: GeoTable = serde_json::from_str(&json.to_string()).unwrap();
        assert_eq!(back, geo);

        let geometry = json["geometry"].as_object_mut().unwrap();
        let point = geometry.remove("1").unwrap();
        geometry.insert("9".to_string(), point);

        let err = serde_json::from_str::<GeoTable>(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("Unknown row: 9"));
    }
}
