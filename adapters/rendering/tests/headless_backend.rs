use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::{bail, Result};
use tilestep_core::{ActionInput, Command, Event};
use tilestep_rendering::{
    palette, FrameInput, Presentation, RenderingBackend, Scene, SpriteRegistry,
};
use tilestep_world::{self as world, World};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Debug, PartialEq)]
struct DrawnFrame {
    clear_color: tilestep_rendering::Color,
    player_x: f32,
    enemies: usize,
    weapons: usize,
}

/// Backend that "draws" by recording what each frame would show.
struct HeadlessBackend {
    inputs: Vec<ActionInput>,
    drawn: Rc<RefCell<Vec<DrawnFrame>>>,
}

impl RenderingBackend for HeadlessBackend {
    type Texture = &'static str;

    fn run<F>(
        self,
        presentation: Presentation,
        sprites: &SpriteRegistry<Self::Texture>,
        mut update_scene: F,
    ) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        if sprites.find("player").is_none() {
            bail!("no player sprite registered");
        }

        let mut scene = presentation.scene;
        for actions in self.inputs {
            let input = FrameInput {
                actions,
                cursor_world_space: None,
            };
            update_scene(FRAME, input, &mut scene);
            self.drawn.borrow_mut().push(DrawnFrame {
                clear_color: presentation.clear_color,
                player_x: scene.player.bounds.left(),
                enemies: scene.enemies.len(),
                weapons: scene.weapons.len(),
            });
        }
        Ok(())
    }
}

fn run_frames(inputs: Vec<ActionInput>) -> Result<Vec<DrawnFrame>> {
    let mut simulation = World::new();
    let presentation = Presentation::for_world("Tilestep", &simulation);
    let mut sprites = SpriteRegistry::new();
    let _ = sprites.register("player", "player.png");

    let drawn = Rc::new(RefCell::new(Vec::new()));
    let backend = HeadlessBackend {
        inputs,
        drawn: Rc::clone(&drawn),
    };
    backend.run(presentation, &sprites, move |dt, input, scene| {
        let mut events: Vec<Event> = Vec::new();
        world::apply(
            &mut simulation,
            Command::Tick {
                dt,
                input: input.actions,
            },
            &mut events,
        );
        *scene = Scene::capture(&simulation);
    })?;

    let frames = drawn.borrow().clone();
    Ok(frames)
}

#[test]
fn backend_sees_every_refreshed_frame() {
    let walk_right = ActionInput {
        move_right: true,
        ..ActionInput::default()
    };
    let throw = ActionInput {
        throw_weapon: true,
        ..ActionInput::default()
    };
    let mut inputs = vec![walk_right; 10];
    inputs.push(throw);

    let frames = run_frames(inputs).expect("headless run succeeds");

    assert_eq!(frames.len(), 11);
    assert!(frames
        .iter()
        .all(|frame| frame.clear_color == palette::BACKGROUND));
    assert!(frames.windows(2).take(9).all(|pair| pair[1].player_x > pair[0].player_x));
    assert_eq!(frames[9].weapons, 0);
    assert_eq!(frames[10].weapons, 1);
    assert!(frames.iter().all(|frame| frame.enemies == 3));
}

#[test]
fn headless_runs_are_deterministic() {
    let script: Vec<ActionInput> = (0..40)
        .map(|frame| ActionInput {
            move_left: frame % 7 == 0,
            move_right: frame % 3 != 0,
            jump: frame == 12,
            dash: frame == 20,
            ..ActionInput::default()
        })
        .collect();

    let first = run_frames(script.clone()).expect("first run");
    let second = run_frames(script).expect("second run");

    assert_eq!(first, second);
}

#[test]
fn missing_sprites_abort_the_run() {
    let backend = HeadlessBackend {
        inputs: vec![ActionInput::default()],
        drawn: Rc::new(RefCell::new(Vec::new())),
    };
    let presentation = Presentation::for_world("Tilestep", &World::new());

    let result = backend.run(presentation, &SpriteRegistry::new(), |_, _, _| {});

    assert!(result.is_err());
}
