use ordered_float::OrderedFloat;
use svg::{
    node::element::{path::Data, Path as SvgPath, Rectangle},
    Document,
};

use common::slice::SliceResult;

use crate::SliceError;

/// Margin between a contour and its sheet cell border, in mm.
const CELL_MARGIN: f32 = 2.0;

/// A slice result laid out as a grid of sheet cells, one layer per cell,
/// bottom layer first, ready for a laser cutter. One user unit is one mm;
/// the document Y axis points down, so contours are flipped from the
/// slicer's Y-up frame on the way in.
pub struct SvgFile {
    document: Document,
}

impl SvgFile {
    pub fn from_result(result: &SliceResult) -> Result<Self, SliceError> {
        if result.layers.is_empty() {
            return Err(SliceError::EmptyResult);
        }

        // Square cells big enough for the widest contour on any layer.
        let radius = result
            .layers
            .iter()
            .flat_map(|layer| &layer.paths)
            .flat_map(|path| &path.points)
            .map(|point| OrderedFloat(point.x.abs().max(point.y.abs())))
            .max()
            .map_or(0.0, |radius| radius.0);
        let cell = 2.0 * (radius + CELL_MARGIN);

        let sides = result.layers.len().isqrt() + 1;
        let size = sides as f32 * cell;

        let mut document = Document::new()
            .set("viewBox", (0.0, 0.0, size, size))
            .set("width", format!("{size}mm"))
            .set("height", format!("{size}mm"));

        for (index, layer) in result.layers.iter().enumerate() {
            let x0 = (index % sides) as f32 * cell;
            let y0 = (index / sides) as f32 * cell;

            document = document.add(
                Rectangle::new()
                    .set("x", x0)
                    .set("y", y0)
                    .set("width", cell)
                    .set("height", cell)
                    .set("fill", "none")
                    .set("stroke", "gray")
                    .set("stroke-width", "0.1"),
            );

            // Contours are centred in their cell, Y flipped.
            let centre = (x0 + cell / 2.0, y0 + cell / 2.0);
            for path in layer.paths.iter() {
                let mut points = path
                    .points
                    .iter()
                    .map(|point| (centre.0 + point.x, centre.1 - point.y));

                let Some(first) = points.next() else { continue };
                let mut data = Data::new().move_to(first);
                for point in points {
                    data = data.line_to(point);
                }
                if path.closed {
                    data = data.close();
                }

                document = document.add(
                    SvgPath::new()
                        .set("d", data)
                        .set("fill", "none")
                        .set("stroke", "black")
                        .set("stroke-width", "0.1"),
                );
            }
        }

        Ok(Self { document })
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
