/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::*;
use iwp_common::structures::{Array2D, Point2D};
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_raster::*;
use iwp_vector::*;
use std::collections::VecDeque;
use std::io::Error;
use std::time::Instant;

/// This tool converts raster lines features into a vector of the POLYLINE
/// ShapeType. Grid cells associated with line features are identified in the
/// input raster by any positive, non-zero value; zero and nodata cells are
/// background. The input is expected to be a line-thinned (single-cell wide)
/// image, such as the output of `LineThinning`.
///
/// Tracing begins at line ends and then picks up any remaining closed loops.
/// Branches begin at the junction cell they leave, and a line that ends next
/// to an already traced cell is joined to it, so the output network is
/// connected wherever the raster is. Vertices are placed at cell centres.
/// Isolated single cells produce no output.
///
/// # See Also
/// `LineThinning`, `VectorPolygonsToRaster`
pub struct RasterToVectorLines {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl RasterToVectorLines {
    pub fn new() -> RasterToVectorLines {
        // public constructor
        let name = "RasterToVectorLines".to_string();
        let toolbox = "Data Tools".to_string();
        let description = "Converts a raster lines features into a vector of the POLYLINE shapetype".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Raster Lines File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input raster lines file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Vector Lines File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector lines file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Tile Name".to_owned(),
            flags: vec!["--tile".to_owned()],
            description: "Optional value for a TILE attribute on every output line.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(&name, "-i=skeleton.asc -o=network.shp");

        RasterToVectorLines {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for RasterToVectorLines {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let args = ToolArgs::parse(&args)?;
        let input_file = args
            .get_file(&["-i", "-input"], working_directory)
            .ok_or_else(|| missing_parameter("input"))?;
        let output_file = args
            .get_file(&["-o", "-output"], working_directory)
            .ok_or_else(|| missing_parameter("output"))?;
        let tile = args.get(&["-tile"]).filter(|t| !t.is_empty());

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let input = Raster::new(&input_file, "r")?;

        let start = Instant::now();

        let lines = trace_lines(&input)?;
        let mut output = lines_to_shapefile(
            &lines,
            &output_file,
            &input.configs.coordinate_ref_system_wkt,
            tile.as_deref(),
        )?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("Traced {} lines", lines.len());
            println!("Saving data...")
        };
        output.write()?;
        if verbose {
            println!("Output file written");
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}

/// Traces the foreground cells of a thinned raster into lines of cell-centre
/// coordinates. Every foreground cell with at least one foreground
/// neighbour is a vertex of at least one line; isolated cells are skipped.
/// Lines traced from the same 8-connected group of cells share vertices, so
/// each group of cells yields one connected network of lines.
pub fn trace_lines(input: &Raster) -> Result<Vec<Vec<Point2D>>, Error> {
    let rows = input.configs.rows as isize;
    let columns = input.configs.columns as isize;
    let nodata = input.configs.nodata;
    let is_foreground = |row: isize, col: isize| {
        let z = input.get_value(row, col);
        z > 0f64 && z != nodata
    };

    // Queue entries carry the traced cell a branch leaves from, if any.
    let mut queue: VecDeque<(isize, isize, Option<(isize, isize)>)> = VecDeque::new();

    // calculate the number of neighbouring cells
    let mut num_neighbours: Array2D<i8> = Array2D::new(rows, columns, 0, -1)?;
    let mut visited: Array2D<i8> = Array2D::new(rows, columns, 1, -1)?;
    let dx = [1, 1, 1, 0, -1, -1, -1, 0];
    let dy = [-1, 0, 1, 1, 1, 0, -1, -1];
    for row in 0..rows {
        for col in 0..columns {
            if is_foreground(row, col) {
                let count = (0..8)
                    .filter(|&i| is_foreground(row + dy[i], col + dx[i]))
                    .count() as i8;
                num_neighbours.set_value(row, col, count);
                if count == 1 {
                    // It's a line end; add it to the queue
                    queue.push_back((row, col, None));
                }
                if count > 0 {
                    visited.set_value(row, col, 0);
                }
            }
        }
    }

    let mut lines = vec![];
    let mut seed_row = 0isize;
    let mut seed_col = 0isize;
    loop {
        while let Some((start_row, start_col, from)) = queue.pop_front() {
            if visited.get_value(start_row, start_col) != 0 {
                continue;
            }
            // it's still a non-traced line
            let mut cells: Vec<(isize, isize)> = vec![];
            if let Some(junction) = from {
                cells.push(junction);
            }
            let (mut row, mut col) = (start_row, start_col);
            loop {
                cells.push((row, col));
                visited.set_value(row, col, 1);

                // find the unvisited neighbour with the most neighbours
                let mut highest = 0i8;
                let mut next = None;
                for i in 0..8 {
                    let (row_n, col_n) = (row + dy[i], col + dx[i]);
                    if visited.get_value(row_n, col_n) != 0 {
                        continue;
                    }
                    let count = num_neighbours.get_value(row_n, col_n);
                    if count > highest {
                        if let Some((r, c)) = next {
                            queue.push_back((r, c, Some((row, col))));
                        }
                        highest = count;
                        next = Some((row_n, col_n));
                    } else {
                        queue.push_back((row_n, col_n, Some((row, col))));
                    }
                }
                match next {
                    Some((r, c)) => {
                        row = r;
                        col = c;
                    }
                    None => {
                        // end of the line; join it to a traced neighbour
                        if let Some(join) = find_join(&cells, &visited, &num_neighbours, &dx, &dy) {
                            cells.push(join);
                        }
                        break;
                    }
                }
            }

            if cells.len() > 1 {
                lines.push(cells);
            }
        }

        // whatever remains untraced belongs to closed loops
        let mut found = false;
        while seed_row < rows && !found {
            while seed_col < columns {
                if visited.get_value(seed_row, seed_col) == 0 {
                    queue.push_back((seed_row, seed_col, None));
                    found = true;
                    break;
                }
                seed_col += 1;
            }
            if !found {
                seed_row += 1;
                seed_col = 0;
            }
        }
        if !found {
            break;
        }
    }

    connect_lines(&mut lines, &is_foreground, rows, columns)?;

    Ok(lines
        .iter()
        .map(|cells| {
            cells
                .iter()
                .map(|&(r, c)| Point2D::new(input.get_x_from_column(c), input.get_y_from_row(r)))
                .collect()
        })
        .collect())
}

/// Disjoint sets of line indices; lines sharing a cell are in one set.
struct LineGroups {
    parent: Vec<usize>,
}

impl LineGroups {
    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[a] = b;
        }
    }

    fn add(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }
}

/// Records `line` as passing through a cell. The first line through a cell
/// owns it; later lines are grouped with the owner.
fn claim(owner: &mut Array2D<i32>, groups: &mut LineGroups, cell: (isize, isize), line: usize) {
    let current = owner.get_value(cell.0, cell.1);
    if current >= 0 {
        groups.union(current as usize, line);
    } else {
        owner.set_value(cell.0, cell.1, line as i32);
    }
}

/// Appends `other` to the line owning `cell` when `cell` is one of that
/// line's open ends. Returns the extended line.
fn extend_line(
    lines: &mut [Vec<(isize, isize)>],
    owner: i32,
    cell: (isize, isize),
    other: (isize, isize),
) -> Option<usize> {
    if owner < 0 {
        return None;
    }
    let line = &mut lines[owner as usize];
    if line.first() == line.last() {
        // closed ring
        return None;
    }
    if line.last() == Some(&cell) {
        line.push(other);
    } else if line.first() == Some(&cell) {
        line.insert(0, other);
    } else {
        return None;
    }
    Some(owner as usize)
}

/// Bridges adjacent foreground cells whose lines are not yet connected,
/// either by extending a line end onto the neighbour or by a two-vertex
/// line between them. Afterwards the lines of an 8-connected group of cells
/// form a single network.
fn connect_lines(
    lines: &mut Vec<Vec<(isize, isize)>>,
    is_foreground: &dyn Fn(isize, isize) -> bool,
    rows: isize,
    columns: isize,
) -> Result<(), Error> {
    let dx = [1, 1, 1, 0, -1, -1, -1, 0];
    let dy = [-1, 0, 1, 1, 1, 0, -1, -1];
    let mut owner: Array2D<i32> = Array2D::new(rows, columns, -1, -1)?;
    let mut groups = LineGroups {
        parent: (0..lines.len()).collect(),
    };
    for (i, cells) in lines.iter().enumerate() {
        for &cell in cells {
            claim(&mut owner, &mut groups, cell, i);
        }
    }

    for row in 0..rows {
        for col in 0..columns {
            if !is_foreground(row, col) {
                continue;
            }
            for i in 0..8 {
                let (row_n, col_n) = (row + dy[i], col + dx[i]);
                if !is_foreground(row_n, col_n) {
                    continue;
                }
                let a = owner.get_value(row, col);
                let b = owner.get_value(row_n, col_n);
                if a >= 0 && b >= 0 && groups.find(a as usize) == groups.find(b as usize) {
                    continue;
                }
                let line = match extend_line(lines, a, (row, col), (row_n, col_n))
                    .or_else(|| extend_line(lines, b, (row_n, col_n), (row, col)))
                {
                    Some(line) => line,
                    None => {
                        lines.push(vec![(row, col), (row_n, col_n)]);
                        groups.add()
                    }
                };
                claim(&mut owner, &mut groups, (row, col), line);
                claim(&mut owner, &mut groups, (row_n, col_n), line);
            }
        }
    }
    Ok(())
}

/// Picks a traced foreground neighbour of the last cell of `cells` to close the line
/// onto. The line's own recent cells, and cells touching the one before the
/// last, are passed over so that lines do not fold back on themselves.
fn find_join(
    cells: &[(isize, isize)],
    visited: &Array2D<i8>,
    num_neighbours: &Array2D<i8>,
    dx: &[isize; 8],
    dy: &[isize; 8],
) -> Option<(isize, isize)> {
    let (row, col) = *cells.last()?;
    let recent = &cells[cells.len().saturating_sub(3)..];
    let previous = if cells.len() > 1 {
        Some(cells[cells.len() - 2])
    } else {
        None
    };
    (0..8)
        .map(|i| (row + dy[i], col + dx[i]))
        .filter(|&(r, c)| visited.get_value(r, c) == 1 && num_neighbours.get_value(r, c) > 0)
        .filter(|cell| !recent.contains(cell))
        .find(|&(r, c)| match previous {
            Some((pr, pc)) => (r - pr).abs() > 1 || (c - pc).abs() > 1,
            None => true,
        })
}

/// Creates a PolyLine Shapefile holding one record per line, with a 1-based
/// `FID` and, when `tile` is given, a `TILE` attribute.
pub fn lines_to_shapefile(
    lines: &[Vec<Point2D>],
    file_name: &str,
    projection: &str,
    tile: Option<&str>,
) -> Result<Shapefile, Error> {
    let mut output = Shapefile::new(file_name, ShapeType::PolyLine)?;

    // set the projection information
    if projection != "not specified" {
        output.projection = projection.to_string();
    }

    // add the attributes
    output
        .attributes
        .add_field(&AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8));
    if tile.is_some() {
        output
            .attributes
            .add_field(&AttributeField::new("TILE", FieldDataType::Text, 80u8, 0u8));
    }

    for (i, points) in lines.iter().enumerate() {
        let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
        sfg.add_part(points);
        output.add_record(sfg)?;
        let mut rec = vec![FieldData::Int(i as i32 + 1)];
        if let Some(t) = tile {
            rec.push(FieldData::Text(t.to_string()));
        }
        output.attributes.add_record(rec, false);
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use super::{lines_to_shapefile, trace_lines};
    use crate::tools::image_analysis::thin;
    use iwp_common::structures::Point2D;
    use iwp_raster::{DataType, Raster, RasterConfigs};
    use iwp_vector::{FieldData, ShapeType, Shapefile};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn grid(cells: &[&str]) -> Raster {
        let mut configs = RasterConfigs::default();
        configs.rows = cells.len();
        configs.columns = cells[0].len();
        configs.west = 500.0;
        configs.north = 1000.0;
        configs.resolution_x = 0.5;
        configs.resolution_y = 0.5;
        configs.east = 500.0 + 0.5 * configs.columns as f64;
        configs.south = 1000.0 - 0.5 * configs.rows as f64;
        configs.nodata = 255.0;
        configs.data_type = DataType::U8;
        let mut r = Raster::initialize_using_config("skeleton.asc", &configs);
        r.reinitialize_values(0.0);
        for (row, line) in cells.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    r.set_value(row as isize, col as isize, 1.0);
                }
            }
        }
        r
    }

    fn cell_of(r: &Raster, p: &Point2D) -> (isize, isize) {
        (r.get_row_from_y(p.y), r.get_column_from_x(p.x))
    }

    /// Every non-isolated foreground cell, and nothing else, is a vertex.
    fn assert_coverage(r: &Raster, lines: &[Vec<Point2D>]) {
        let vertices: HashSet<(isize, isize)> = lines
            .iter()
            .flat_map(|l| l.iter().map(|p| cell_of(r, p)))
            .collect();
        for row in 0..r.configs.rows as isize {
            for col in 0..r.configs.columns as isize {
                let fg = r.get_value(row, col) == 1.0;
                let has_neighbour = (-1..=1).any(|dr| {
                    (-1..=1).any(|dc| {
                        (dr != 0 || dc != 0) && r.get_value(row + dr, col + dc) == 1.0
                    })
                });
                assert_eq!(
                    vertices.contains(&(row, col)),
                    fg && has_neighbour,
                    "cell ({}, {})",
                    row,
                    col
                );
            }
        }
    }

    /// Counts groups of lines that share vertices.
    fn num_networks(r: &Raster, lines: &[Vec<Point2D>]) -> usize {
        let mut parent: Vec<usize> = (0..lines.len()).collect();
        fn find(parent: &mut Vec<usize>, i: usize) -> usize {
            let mut i = i;
            while parent[i] != i {
                i = parent[i];
            }
            i
        }
        let sets: Vec<HashSet<(isize, isize)>> = lines
            .iter()
            .map(|l| l.iter().map(|p| cell_of(r, p)).collect())
            .collect();
        for i in 0..lines.len() {
            for j in i + 1..lines.len() {
                if !sets[i].is_disjoint(&sets[j]) {
                    let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                    parent[a] = b;
                }
            }
        }
        (0..lines.len()).filter(|&i| find(&mut parent, i) == i).count()
    }

    #[test]
    fn test_single_line_georeferencing() {
        let r = grid(&["......", ".####.", "......"]);
        let lines = trace_lines(&r).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
        let xs: Vec<f64> = lines[0].iter().map(|p| p.x).collect();
        assert!(xs == vec![500.75, 501.25, 501.75, 502.25] || xs == vec![502.25, 501.75, 501.25, 500.75]);
        assert_eq!(lines[0][0].y, 999.25);
    }

    #[test]
    fn test_isolated_pixels_are_dropped() {
        let r = grid(&["#.....", "...#..", "......", ".##..#"]);
        let lines = trace_lines(&r).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 2);
        assert_coverage(&r, &lines);
    }

    #[test]
    fn test_branches_meet_at_junctions() {
        let r = grid(&[
            "#.....#", //
            ".#...#.", //
            "..#.#..", //
            "...#...", //
            "...#...", //
            "...#...", //
        ]);
        let lines = trace_lines(&r).unwrap();
        assert_coverage(&r, &lines);
        assert_eq!(num_networks(&r, &lines), 1);
    }

    #[test]
    fn test_loops_are_closed() {
        let r = grid(&[
            ".......", //
            "..###..", //
            ".#...#.", //
            ".#...#.", //
            "..###..", //
            ".......", //
        ]);
        let lines = trace_lines(&r).unwrap();
        assert_eq!(lines.len(), 1);
        assert_coverage(&r, &lines);
        let first = lines[0].first().unwrap();
        let last = lines[0].last().unwrap();
        assert_eq!(first, last);
    }

    #[test]
    fn test_thinned_network_is_one_piece() {
        let buffer = grid(&[
            "..........",
            ".########.",
            ".########.",
            ".##....##.",
            ".##....##.",
            ".########.",
            ".########.",
            "....##....",
            "....##....",
            "....##....",
        ]);
        let skeleton = thin(&buffer, "skeleton.asc");
        let lines = trace_lines(&skeleton).unwrap();
        assert!(!lines.is_empty());
        assert_coverage(&skeleton, &lines);
        assert_eq!(num_networks(&skeleton, &lines), 1);
    }

    /// A union of random rectangles, as buffers of nearby features look.
    fn random_grid(rng: &mut StdRng) -> Raster {
        let rows = rng.gen_range(8..=30);
        let columns = rng.gen_range(8..=30);
        let mut cells = vec![vec!['.'; columns]; rows];
        for _ in 0..rng.gen_range(1..=8) {
            let (row0, col0) = (rng.gen_range(0..rows), rng.gen_range(0..columns));
            let (height, width) = (rng.gen_range(1..=8), rng.gen_range(1..=8));
            for row in row0..(row0 + height).min(rows) {
                for col in col0..(col0 + width).min(columns) {
                    cells[row][col] = '#';
                }
            }
        }
        let lines: Vec<String> = cells.iter().map(|l| l.iter().collect()).collect();
        let refs: Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        grid(&refs)
    }

    /// Returns the number of 8-connected groups of foreground cells and how
    /// many of them are single cells.
    fn components(r: &Raster) -> (usize, usize) {
        let rows = r.configs.rows as isize;
        let columns = r.configs.columns as isize;
        let mut seen = HashSet::new();
        let (mut count, mut isolated) = (0, 0);
        for row in 0..rows {
            for col in 0..columns {
                if r.get_value(row, col) != 1.0 || seen.contains(&(row, col)) {
                    continue;
                }
                count += 1;
                seen.insert((row, col));
                let mut stack = vec![(row, col)];
                let mut size = 0;
                while let Some((r0, c0)) = stack.pop() {
                    size += 1;
                    for dr in -1..=1 {
                        for dc in -1..=1 {
                            let n = (r0 + dr, c0 + dc);
                            if r.get_value(n.0, n.1) == 1.0 && seen.insert(n) {
                                stack.push(n);
                            }
                        }
                    }
                }
                if size == 1 {
                    isolated += 1;
                }
            }
        }
        (count, isolated)
    }

    #[test]
    fn test_lines_alongside_earlier_lines_are_joined() {
        // the second line starts diagonally beside a cell of the first
        let r = grid(&[
            "#..##", //
            ".##..", //
            ".#...", //
            "##...", //
            "..#..", //
        ]);
        let lines = trace_lines(&r).unwrap();
        assert_coverage(&r, &lines);
        let (count, isolated) = components(&r);
        assert_eq!(num_networks(&r, &lines) + isolated, count);
    }

    #[test]
    fn test_skeleton_components_trace_to_one_network_each() {
        let mut rng = StdRng::seed_from_u64(42);
        for trial in 0..300 {
            let skeleton = thin(&random_grid(&mut rng), "skeleton.asc");
            let lines = trace_lines(&skeleton).unwrap();
            assert_coverage(&skeleton, &lines);
            let (count, isolated) = components(&skeleton);
            assert_eq!(
                num_networks(&skeleton, &lines) + isolated,
                count,
                "trial {}",
                trial
            );
            for line in &lines {
                for pair in line.windows(2) {
                    let (a, b) = (cell_of(&skeleton, &pair[0]), cell_of(&skeleton, &pair[1]));
                    assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1, "trial {}", trial);
                }
            }
        }
    }

    #[test]
    fn test_lines_to_shapefile() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("net.shp").to_string_lossy().to_string();
        let lines = vec![
            vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)],
            vec![Point2D::new(1.0, 1.0), Point2D::new(1.0, 2.0), Point2D::new(2.0, 2.0)],
        ];
        let mut sf = lines_to_shapefile(&lines, &file_name, "PROJCS[\"x\"]", Some("tile_07")).unwrap();
        sf.write().unwrap();
        let reread = Shapefile::read(&file_name).unwrap();
        assert_eq!(reread.header.shape_type, ShapeType::PolyLine);
        assert_eq!(reread.num_records, 2);
        assert_eq!(reread.attributes.get_value(1, "FID"), FieldData::Int(2));
        assert_eq!(
            reread.attributes.get_value(0, "TILE"),
            FieldData::Text("tile_07".to_string())
        );
        assert_eq!(reread.projection, "PROJCS[\"x\"]");
        assert_eq!(reread.records[0].get_line_length(), 5.0);
    }
}
