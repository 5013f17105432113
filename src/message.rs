// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsgChr {
    pub line: u16,
    pub col: u16,
    pub val: char,
}

const PAD_X: u16 = 2;
const PAD_Y: u16 = 1;

/// Lays `text` out as a centered box on a `cols` x `lines` grid.
///
/// Long lines wrap, extra lines are dropped. Returns nothing when the grid is
/// too small to hold even an empty box.
pub fn layout_message(text: &str, border: bool, cols: u16, lines: u16) -> Vec<MsgChr> {
    let border: u16 = if border { 1 } else { 0 };
    let frame_w = 2 * border + 2 * PAD_X;
    let frame_h = 2 * border + 2 * PAD_Y;
    if cols <= frame_w || lines <= frame_h {
        return Vec::new();
    }

    let max_w = (cols - frame_w) as usize;
    let max_h = (lines - frame_h) as usize;

    let mut rows: Vec<Vec<char>> = Vec::new();
    for raw in text.split('\n') {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            rows.push(Vec::new());
        } else {
            rows.extend(chars.chunks(max_w).map(<[char]>::to_vec));
        }
    }
    rows.truncate(max_h);
    if rows.is_empty() {
        rows.push(Vec::new());
    }

    let content_w = rows.iter().map(Vec::len).max().unwrap_or(0).max(1) as u16;
    let content_h = rows.len() as u16;
    let box_w = content_w + frame_w;
    let box_h = content_h + frame_h;
    let start_col = cols / 2 - box_w / 2;
    let start_line = lines / 2 - box_h / 2;

    let mut out = Vec::with_capacity(box_w as usize * box_h as usize);
    for y in 0..box_h {
        for x in 0..box_w {
            let edge_y = y == 0 || y + 1 == box_h;
            let edge_x = x == 0 || x + 1 == box_w;
            let mut val = match (border == 1, edge_y, edge_x) {
                (true, true, true) => '+',
                (true, true, false) => '-',
                (true, false, true) => '|',
                _ => ' ',
            };

            let inner_y = y.wrapping_sub(border + PAD_Y) as usize;
            let inner_x = x.wrapping_sub(border + PAD_X) as usize;
            if let Some(row) = rows.get(inner_y) {
                let left_pad = (content_w as usize - row.len()) / 2;
                if inner_x >= left_pad && inner_x < left_pad + row.len() {
                    val = row[inner_x - left_pad];
                }
            }

            out.push(MsgChr {
                line: start_line + y,
                col: start_col + x,
                val,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(chars: &[MsgChr], cols: u16, lines: u16) -> Vec<String> {
        let mut grid = vec![vec!['.'; cols as usize]; lines as usize];
        for c in chars {
            grid[c.line as usize][c.col as usize] = c.val;
        }
        grid.into_iter().map(|r| r.into_iter().collect()).collect()
    }

    #[test]
    fn bordered_box_is_centered() {
        let out = layout_message("hi", true, 12, 5);
        assert_eq!(
            render(&out, 12, 5),
            vec![
                "..+------+..",
                "..|      |..",
                "..|  hi  |..",
                "..|      |..",
                "..+------+..",
            ]
        );
    }

    #[test]
    fn long_lines_wrap_and_overflow_is_dropped() {
        let out = layout_message("abcdefgh\nzz", false, 8, 4);
        let grid = render(&out, 8, 4);
        assert_eq!(grid[1], "  abcd  ");
        assert_eq!(grid[2], "  efgh  ");
        assert!(!grid.iter().any(|r| r.contains('z')));
    }

    #[test]
    fn tiny_grid_gets_no_box() {
        assert!(layout_message("hello", true, 6, 10).is_empty());
        assert!(layout_message("hello", false, 40, 2).is_empty());
    }
}
