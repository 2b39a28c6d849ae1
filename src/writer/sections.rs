//! Text rendering of the tables. Sections are written in a fixed order, each
//! followed by an empty line; sections without rows are left out.

use std::fmt::Write;

use super::WriteOptions;
use super::format::{g, g9};
use super::tables::Tables;
use crate::value::{Definition, Definitions};

pub fn render(
    defs: &Definitions,
    tables: &Tables,
    opts: &WriteOptions,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Pulseq sequence file")?;
    writeln!(out, "# Created by {}", opts.creator)?;
    writeln!(out)?;

    version(&mut out, opts)?;
    definitions(&mut out, defs)?;
    if !tables.blocks.is_empty() {
        blocks(&mut out, tables)?;
    }
    if !tables.rf.is_empty() {
        rf(&mut out, tables)?;
    }
    if !tables.gradients.is_empty() {
        gradients(&mut out, tables)?;
    }
    if !tables.traps.is_empty() {
        traps(&mut out, tables)?;
    }
    if !tables.adc.is_empty() {
        adc(&mut out, tables)?;
    }
    if !tables.shapes.is_empty() {
        shapes(&mut out, tables)?;
    }
    Ok(out)
}

fn version(out: &mut String, opts: &WriteOptions) -> std::fmt::Result {
    writeln!(out, "[VERSION]")?;
    writeln!(out, "major {}", opts.version.major)?;
    writeln!(out, "minor {}", opts.version.minor)?;
    writeln!(out, "revision {}", opts.version.revision)?;
    writeln!(out)
}

fn definitions(out: &mut String, defs: &Definitions) -> std::fmt::Result {
    writeln!(out, "[DEFINITIONS]")?;
    for (name, value) in defs.iter() {
        write!(out, "{name}")?;
        match value {
            Definition::Int(x) => write!(out, " {x}")?,
            Definition::Float(x) => write!(out, " {}", g9(*x))?,
            Definition::Str(x) => write!(out, " {x}")?,
            Definition::List(xs) => {
                for x in xs {
                    write!(out, " {}", g9(*x))?;
                }
            }
        }
        writeln!(out)?;
    }
    writeln!(out)
}

fn blocks(out: &mut String, tables: &Tables) -> std::fmt::Result {
    let id_width = digits(tables.blocks.len() as i64);
    let dur_width = tables
        .blocks
        .iter()
        .map(|b| digits(b.duration))
        .max()
        .unwrap_or(1)
        .max(3);

    writeln!(out, "# Format of blocks:")?;
    writeln!(out, "# NUM DUR RF  GX  GY  GZ  ADC  EXT")?;
    writeln!(out, "[BLOCKS]")?;
    for b in &tables.blocks {
        writeln!(
            out,
            "{:>id_width$} {:>dur_width$} {:>3} {:>3} {:>3} {:>3} {:>3} {:>2}",
            b.index, b.duration, b.rf, b.gx, b.gy, b.gz, b.adc, b.ext
        )?;
    }
    writeln!(out)
}

fn rf(out: &mut String, tables: &Tables) -> std::fmt::Result {
    writeln!(out, "# Format of RF events:")?;
    writeln!(out, "# id amplitude mag_id phase_id time_shape_id delay freq phase")?;
    writeln!(out, "# ..        Hz   ....     ....          ....    us   Hz   rad")?;
    writeln!(out, "[RF]")?;
    for r in &tables.rf {
        writeln!(
            out,
            "{} {:>12} {} {} {} {} {} {}",
            r.id,
            g(r.amplitude),
            r.magnitude_id,
            r.phase_id,
            r.time_id,
            g(r.delay),
            g(r.frequency),
            g(r.phase)
        )?;
    }
    writeln!(out)
}

fn gradients(out: &mut String, tables: &Tables) -> std::fmt::Result {
    writeln!(out, "# Format of arbitrary gradients:")?;
    writeln!(
        out,
        "#   time_shape_id of 0 means default timing (stepping with grad_raster starting at 1/2 of grad_raster)"
    )?;
    writeln!(out, "# id amplitude amp_shape_id time_shape_id delay")?;
    writeln!(out, "# ..      Hz/m       ..         ..          us")?;
    writeln!(out, "[GRADIENTS]")?;
    for r in &tables.gradients {
        writeln!(
            out,
            "{} {:>12} {} {} {}",
            r.id,
            g(r.amplitude),
            r.amplitude_id,
            r.time_id,
            g(r.delay)
        )?;
    }
    writeln!(out)
}

fn traps(out: &mut String, tables: &Tables) -> std::fmt::Result {
    writeln!(out, "# Format of trapezoid gradients:")?;
    writeln!(out, "# id amplitude rise flat fall delay")?;
    writeln!(out, "# ..      Hz/m   us   us   us    us")?;
    writeln!(out, "[TRAP]")?;
    for r in &tables.traps {
        writeln!(
            out,
            "{:>2} {:>12} {:>3} {:>4} {:>3} {:>3}",
            r.id,
            g(r.amplitude),
            g(r.rise),
            g(r.flat),
            g(r.fall),
            g(r.delay)
        )?;
    }
    writeln!(out)
}

fn adc(out: &mut String, tables: &Tables) -> std::fmt::Result {
    writeln!(out, "# Format of ADC events:")?;
    writeln!(out, "# id num dwell delay freq phase")?;
    writeln!(out, "# ..  ..    ns    us   Hz   rad")?;
    writeln!(out, "[ADC]")?;
    for r in &tables.adc {
        writeln!(
            out,
            "{} {} {} {} {} {}",
            r.id,
            r.num_samples,
            g(r.dwell),
            g(r.delay),
            g(r.frequency),
            g(r.phase)
        )?;
    }
    writeln!(out)
}

fn shapes(out: &mut String, tables: &Tables) -> std::fmt::Result {
    writeln!(out, "# Sequence Shapes")?;
    writeln!(out, "[SHAPES]")?;
    writeln!(out)?;
    for shape in &tables.shapes {
        writeln!(out, "shape_id {}", shape.id)?;
        writeln!(out, "num_samples {}", shape.num_samples)?;
        for x in &shape.data {
            writeln!(out, "{}", g9(*x))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn digits(x: i64) -> usize {
    x.unsigned_abs().checked_ilog10().map_or(1, |d| d as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::compress::StoredShape;
    use crate::writer::tables::{AdcRow, BlockRow, TrapRow};

    fn block(index: usize, duration: i64) -> BlockRow {
        BlockRow {
            index,
            duration,
            rf: 0,
            gx: 1,
            gy: 0,
            gz: 0,
            adc: 0,
            ext: 0,
        }
    }

    #[test]
    fn digit_counts() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(12345), 5);
    }

    #[test]
    fn empty_tables_are_left_out() {
        let text = render(
            &Definitions::new(),
            &Tables::default(),
            &WriteOptions::default(),
        )
        .unwrap();
        assert!(text.starts_with("# Pulseq sequence file\n"));
        assert!(text.contains("[VERSION]\nmajor 1\nminor 4\nrevision 1\n\n"));
        assert!(text.ends_with("[DEFINITIONS]\n\n"));
        for section in [
            "[BLOCKS]",
            "[RF]",
            "[GRADIENTS]",
            "[TRAP]",
            "[ADC]",
            "[SHAPES]",
        ] {
            assert!(!text.contains(section));
        }
    }

    #[test]
    fn definitions_sorted_and_formatted() {
        let mut defs = Definitions::new();
        defs.insert("Name", "tse")
            .insert("FOV", vec![0.256, 0.256, 0.003])
            .insert("AdcRasterTime", 1e-7)
            .insert("Averages", 2i64);
        let text = render(&defs, &Tables::default(), &WriteOptions::default()).unwrap();
        assert!(text.contains(
            "[DEFINITIONS]\nAdcRasterTime 1e-07\nAverages 2\nFOV 0.256 0.256 0.003\nName tse\n\n"
        ));
    }

    #[test]
    fn fixed_width_rows() {
        let tables = Tables {
            blocks: (1..=10).map(|i| block(i, 122)).collect(),
            traps: vec![TrapRow {
                id: 1,
                amplitude: 425774.78518,
                rise: 100.0,
                flat: 1000.0,
                fall: 100.0,
                delay: 20.0,
            }],
            adc: vec![AdcRow {
                id: 1,
                num_samples: 128,
                dwell: 5000.0,
                delay: 10.0,
                frequency: 0.0,
                phase: 0.0,
            }],
            ..Default::default()
        };
        let text = render(&Definitions::new(), &tables, &WriteOptions::default()).unwrap();
        assert!(text.contains("[BLOCKS]\n 1 122   0   1   0   0   0  0\n"));
        assert!(text.contains("\n10 122   0   1   0   0   0  0\n\n"));
        assert!(text.contains("[TRAP]\n 1       425775 100 1000 100  20\n\n"));
        assert!(text.contains("[ADC]\n1 128 5000 10 0 0\n\n"));
    }

    #[test]
    fn shapes_carry_original_length() {
        let tables = Tables {
            shapes: vec![StoredShape {
                id: 1,
                num_samples: 100,
                data: vec![1.0, 0.0, 0.0, 97.0],
            }],
            ..Default::default()
        };
        let text = render(&Definitions::new(), &tables, &WriteOptions::default()).unwrap();
        assert!(text.ends_with("[SHAPES]\n\nshape_id 1\nnum_samples 100\n1\n0\n0\n97\n\n"));
    }
}
