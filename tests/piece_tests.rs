use rand::rngs::StdRng;
use rand::SeedableRng;

use tetrix::piece::{PaletteColor, Piece, PieceError, Position, ShapeType};

fn rows(piece: &Piece) -> Vec<String> {
    piece
        .matrix()
        .iter()
        .map(|row| row.iter().map(|&filled| if filled { '#' } else { '.' }).collect())
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn every_shape_name_parses() {
        for shape in ShapeType::ALL {
            let piece = Piece::from_name(shape.name()).expect("known shape");
            assert_eq!(piece.shape_type, shape);
            assert_eq!(piece.position, Position { x: 0, y: 0 });
            assert_eq!(piece.matrix(), shape.matrix().as_slice());
        }
    }

    #[test]
    fn unknown_shape_name_is_rejected() {
        let err = Piece::from_name("T_Shape").unwrap_err();

        assert_eq!(err, PieceError::InvalidShape("T_Shape".to_string()));
        assert_eq!(err.to_string(), "invalid shape `T_Shape`");
    }

    #[test]
    fn shape_names_are_case_sensitive() {
        assert!("line_3".parse::<ShapeType>().is_err());
        assert_eq!("Line_3".parse::<ShapeType>(), Ok(ShapeType::Line3));
    }

    #[test]
    fn new_piece_picks_a_palette_color() {
        let piece = Piece::new(ShapeType::Plus);
        assert!(PaletteColor::ALL.contains(&piece.color));
    }

    #[test]
    fn random_pieces_follow_the_generator() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            assert_eq!(Piece::random(&mut a), Piece::random(&mut b));
        }
    }

    #[test]
    fn palette_values() {
        assert_eq!(PaletteColor::Red.rgb(), (255, 0, 0));
        assert_eq!(PaletteColor::Orange.rgb(), (255, 128, 0));
        assert_eq!(PaletteColor::ALL.len(), 7);
    }
}

// ============================================================================
// Templates
// ============================================================================

mod templates {
    use super::*;

    #[test]
    fn cell_counts() {
        let expected = [
            (ShapeType::LShape, 4),
            (ShapeType::JShape, 4),
            (ShapeType::SShape, 4),
            (ShapeType::ZShape, 4),
            (ShapeType::OShape, 4),
            (ShapeType::IShape, 4),
            (ShapeType::Cross, 5),
            (ShapeType::Diamond, 6),
            (ShapeType::UShape, 5),
            (ShapeType::Plus, 5),
            (ShapeType::HShape, 7),
            (ShapeType::Line3, 3),
        ];

        for (shape, count) in expected {
            let piece = Piece::with_color(shape, PaletteColor::Cyan);
            assert_eq!(piece.occupied_cells().len(), count, "{shape}");
        }
    }

    #[test]
    fn template_dimensions() {
        let line = Piece::with_color(ShapeType::Line3, PaletteColor::Cyan);
        assert_eq!((line.width(), line.height()), (3, 1));

        let u = Piece::with_color(ShapeType::UShape, PaletteColor::Cyan);
        assert_eq!((u.width(), u.height()), (3, 2));

        let i = Piece::with_color(ShapeType::IShape, PaletteColor::Cyan);
        assert_eq!((i.width(), i.height()), (4, 4));
    }
}

// ============================================================================
// Rotation
// ============================================================================

mod rotation {
    use super::*;

    #[test]
    fn l_shape_rotates_clockwise() {
        let mut piece = Piece::with_color(ShapeType::LShape, PaletteColor::Red);

        piece.rotate();

        assert_eq!(rows(&piece), vec!["###", "#..", "..."]);
    }

    #[test]
    fn non_square_shapes_swap_dimensions() {
        let mut line = Piece::with_color(ShapeType::Line3, PaletteColor::Red);
        line.rotate();
        assert_eq!(rows(&line), vec!["#", "#", "#"]);

        let mut u = Piece::with_color(ShapeType::UShape, PaletteColor::Red);
        u.rotate();
        assert_eq!(rows(&u), vec!["##", "#.", "##"]);
    }

    #[test]
    fn four_rotations_restore_every_template() {
        for shape in ShapeType::ALL {
            let mut piece = Piece::with_color(shape, PaletteColor::Red);
            let original = piece.clone();

            for _ in 0..4 {
                piece.rotate();
            }

            assert_eq!(piece, original, "{shape}");
        }
    }

    #[test]
    fn rotation_keeps_identity_and_position() {
        let mut piece = Piece::new_at(ShapeType::Diamond, PaletteColor::Blue, 3, 7);

        piece.rotate();

        assert_eq!(piece.shape_type, ShapeType::Diamond);
        assert_eq!(piece.color, PaletteColor::Blue);
        assert_eq!(piece.position, Position { x: 3, y: 7 });
    }
}

// ============================================================================
// Movement and Cells
// ============================================================================

mod movement {
    use super::*;

    #[test]
    fn moves_are_unconditional() {
        let mut piece = Piece::with_color(ShapeType::OShape, PaletteColor::Red);

        piece.move_left();
        assert_eq!(piece.position, Position { x: -1, y: 0 });

        piece.move_right();
        piece.move_right();
        piece.move_down();
        assert_eq!(piece.position, Position { x: 1, y: 1 });
    }

    #[test]
    fn occupied_cells_are_absolute() {
        let piece = Piece::new_at(ShapeType::Line3, PaletteColor::Red, 7, 2);

        assert_eq!(
            piece.occupied_cells(),
            vec![
                Position { x: 7, y: 2 },
                Position { x: 8, y: 2 },
                Position { x: 9, y: 2 },
            ]
        );
    }

    #[test]
    fn occupied_cells_skip_empty_template_cells() {
        let piece = Piece::new_at(ShapeType::SShape, PaletteColor::Red, 3, 0);

        assert_eq!(
            piece.occupied_cells(),
            vec![
                Position { x: 4, y: 0 },
                Position { x: 5, y: 0 },
                Position { x: 3, y: 1 },
                Position { x: 4, y: 1 },
            ]
        );
    }
}
