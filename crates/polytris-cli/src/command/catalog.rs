use polytris_engine::{PieceCatalog, Polyomino};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    /// Number of cells of every piece
    #[arg(long, default_value_t = 4)]
    cells: usize,
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    let CatalogArg { cells } = arg;

    let catalog = PieceCatalog::new(*cells)?;
    println!("{} pieces of {cells} cells", catalog.len());
    for (index, piece) in catalog.pieces().iter().enumerate() {
        println!();
        println!("#{index} ({} rotations)", piece.rotation_count());
        for line in side_by_side(piece) {
            println!("  {}", line.trim_end());
        }
    }
    Ok(())
}

// Lines of all rotation variants drawn next to each other, bottom-aligned.
fn side_by_side(piece: &Polyomino) -> Vec<String> {
    let drawings = piece
        .variants()
        .map(|variant| {
            let lines = variant.to_string().lines().map(str::to_owned).collect::<Vec<_>>();
            (variant.width(), lines)
        })
        .collect::<Vec<_>>();
    let height = drawings.iter().map(|(_, lines)| lines.len()).max().unwrap_or(0);

    (0..height)
        .map(|row| {
            drawings
                .iter()
                .map(|(width, lines)| {
                    let pad = height - lines.len();
                    let cell = row
                        .checked_sub(pad)
                        .and_then(|i| lines.get(i))
                        .map_or("", String::as_str);
                    format!("{cell:<width$}   ")
                })
                .collect::<String>()
        })
        .collect()
}
