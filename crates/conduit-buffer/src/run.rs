//! The feature-by-feature producer loop.

use crate::buffer::{concentric_rings, is_empty, polyline_length, RingParams};
use crate::config::Settings;
use crate::elevation::interpolate_elevations;
use crate::error::{ConduitError, FeatureError, Result};
use crate::export::export_faces;
use crate::feedback::Feedback;
use crate::mesh::{tessellate_conduit, CrossSection, Face};
use crate::records::{ConduitPolygon, ExcavationPolygon, LayerSink, TotalPolygon, WallPolygon};
use crate::section::Section;
use crate::source::{Feature, FeatureSource, FieldBinding};
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything derived from one input feature.
#[derive(Debug, Clone)]
pub struct ConduitOutput {
    /// Conduit body.
    pub conduit: ConduitPolygon,
    /// Wall ring, if not degenerate.
    pub wall: Option<WallPolygon>,
    /// Excavation ring, if not degenerate.
    pub excavation: Option<ExcavationPolygon>,
    /// Total footprint, if not empty.
    pub total: Option<TotalPolygon>,
    /// 3D faces; empty unless 3D export is enabled.
    pub faces: Vec<Face>,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Features that produced output.
    pub processed: usize,
    /// Features skipped with a reported problem.
    pub skipped: usize,
    /// The run stopped early on request.
    pub canceled: bool,
    /// Faces accumulated for 3D export, in feature order.
    pub faces: Vec<Face>,
    /// DXF file written by this run.
    pub dxf_path: Option<PathBuf>,
    /// Reason the DXF export failed, if it did.
    pub export_error: Option<String>,
}

/// Conduit buffer processor.
///
/// Holds validated settings; [`run`](Self::run) streams one source into a
/// sink.
#[derive(Debug, Clone)]
pub struct ConduitBuffer {
    settings: Settings,
}

impl ConduitBuffer {
    /// Create a processor, validating the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// The settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process every feature of `source` in order.
    ///
    /// Fails only before any output is produced: for a missing source or an
    /// absent width field. Skipped features and export failures are reported
    /// through `feedback` and counted in the summary.
    pub fn run<S, K, F>(&self, source: Option<&S>, sink: &mut K, feedback: &mut F) -> Result<RunSummary>
    where
        S: FeatureSource + ?Sized,
        K: LayerSink + ?Sized,
        F: Feedback + ?Sized,
    {
        let source = source.ok_or(ConduitError::MissingSource)?;
        let binding = FieldBinding::resolve(&self.settings, &source.field_names())?;
        self.announce(&binding, feedback);

        let count = source.feature_count();
        info!(features = count, export_3d = self.settings.export_3d, "Buffering conduits");

        let mut summary = RunSummary::default();
        let mut progress = 0u8;

        for (current, feature) in source.features().enumerate() {
            if feedback.is_canceled() {
                summary.canceled = true;
                break;
            }

            match self.process_feature(&binding, feature) {
                Ok(output) => {
                    debug!(
                        id = %output.conduit.id,
                        section = %output.conduit.section,
                        faces = output.faces.len(),
                        "Conduit buffered"
                    );
                    summary.faces.extend(emit(output, sink));
                    summary.processed += 1;
                }
                Err(err) => {
                    feedback.report_error(&err.to_string());
                    summary.skipped += 1;
                }
            }

            if count > 0 {
                let percent = (((current + 1) * 100) / count).min(100) as u8;
                progress = progress.max(percent);
                feedback.set_progress(progress);
            }
        }

        if summary.canceled {
            feedback.push_info("Canceled; 3D export skipped");
        } else {
            feedback.set_progress(100);
            self.write_dxf(&mut summary, feedback);
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            canceled = summary.canceled,
            "Conduit buffering finished"
        );
        Ok(summary)
    }

    /// Derive all outputs for one feature.
    pub fn process_feature(
        &self,
        binding: &FieldBinding,
        feature: &Feature,
    ) -> std::result::Result<ConduitOutput, FeatureError> {
        let settings = &self.settings;
        let unit = settings.unit;
        let id = binding.id(feature);

        let raw = binding.width_value(feature);
        if raw.is_null() {
            return Err(FeatureError::NullWidth { id });
        }
        let Some(width) = raw.as_f64() else {
            return Err(FeatureError::NonNumericWidth {
                id,
                value: raw.to_string(),
            });
        };
        if !width.is_finite() || width <= 0.0 {
            return Err(FeatureError::NonPositiveWidth { id, width });
        }
        let line = &feature.geometry;
        if line.len() < 2 {
            return Err(FeatureError::InvalidGeometry {
                id,
                vertices: line.len(),
            });
        }

        let width_mm = unit.to_millimeters(width);
        let height_mm = binding.height(feature).map(|h| unit.to_millimeters(h));
        let section = Section::classify(width_mm, height_mm);

        let rings = concentric_rings(
            line,
            &RingParams {
                radius: unit.to_meters(width) / 2.0,
                wall_thickness: settings.wall_thickness,
                excavation_width: settings.excavation_width,
                segments: settings.buffer_segments,
            },
        );
        let total_width_m = rings.total_width();

        let faces = if settings.export_3d {
            let (z0, z1) = binding.inverts(feature);
            let elevations = interpolate_elevations(line, z0, z1);
            tessellate_conduit(line, &elevations, &CrossSection::from_section(&section))
        } else {
            Vec::new()
        };

        Ok(ConduitOutput {
            conduit: ConduitPolygon {
                id: id.clone(),
                section: section.kind,
                width_mm: section.width_mm,
                height_mm: section.height_mm,
                diameter_mm: section.diameter_mm,
                length_m: polyline_length(line),
                geometry: rings.conduit,
            },
            wall: rings.wall.map(|geometry| WallPolygon {
                id: id.clone(),
                thickness_m: settings.wall_thickness,
                geometry,
            }),
            excavation: rings.excavation.map(|geometry| ExcavationPolygon {
                id: id.clone(),
                width_m: settings.excavation_width,
                geometry,
            }),
            total: (!is_empty(&rings.total)).then(|| TotalPolygon {
                id,
                total_width_m,
                geometry: rings.total,
            }),
            faces,
        })
    }

    fn announce<F: Feedback + ?Sized>(&self, binding: &FieldBinding, feedback: &mut F) {
        let s = &self.settings;
        feedback.push_info(&format!("Width field: {} ({})", binding.width, s.unit.symbol()));
        if let Some(height) = &binding.height {
            feedback.push_info(&format!("Height field: {} (auto-detected)", height));
        }
        feedback.push_info(&format!("Wall thickness: {}m", s.wall_thickness));
        feedback.push_info(&format!("Excavation width: {}m", s.excavation_width));
        if s.export_3d {
            match (&binding.start_invert, &binding.end_invert) {
                (None, None) => feedback.push_info("Invert fields: none, elevations default to 0"),
                (start, end) => feedback.push_info(&format!(
                    "Invert fields: {} / {}",
                    start.as_deref().unwrap_or("-"),
                    end.as_deref().unwrap_or("-")
                )),
            }
        }
    }

    fn write_dxf<F: Feedback + ?Sized>(&self, summary: &mut RunSummary, feedback: &mut F) {
        let Some(path) = self.settings.dxf_path() else {
            return;
        };
        match export_faces(&summary.faces, &path) {
            Ok(()) => {
                feedback.push_info(&format!(
                    "3D export: {} faces written to {}",
                    summary.faces.len(),
                    path.display()
                ));
                summary.dxf_path = Some(path);
            }
            Err(err) => {
                let message = format!("3D export to {} failed: {}", path.display(), err);
                feedback.report_error(&message);
                summary.export_error = Some(message);
            }
        }
    }
}

/// Push one feature's records into the sink, returning its faces.
fn emit<K: LayerSink + ?Sized>(output: ConduitOutput, sink: &mut K) -> Vec<Face> {
    sink.add_conduit(output.conduit);
    if let Some(wall) = output.wall {
        sink.add_wall(wall);
    }
    if let Some(excavation) = output.excavation {
        sink.add_excavation(excavation);
    }
    if let Some(total) = output.total {
        sink.add_total(total);
    }
    output.faces
}
