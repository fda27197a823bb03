use cupcar_core::utils::{
    command::{
        decoder::{decode, dispatch, parse_operand, MAX_COMMAND_LEN},
        maneuver::{ManeuverParseError, MANEUVER_CHANNEL},
        CommandError, CommandFrame, ManeuverCommand, Opcode,
    },
    controllers::state::ActuatorState,
};

#[test]
fn drive_command_sets_drive_target() {
    let state = ActuatorState::new();
    let frame = dispatch(b"P50", &state).unwrap();
    assert_eq!(
        frame,
        CommandFrame {
            opcode: Opcode::Drive,
            operand: 50
        }
    );
    assert_eq!(state.drive_target(), 50);
    assert_eq!(state.steer_target(), 0);
}

#[test]
fn steer_command_sets_steer_target() {
    let state = ActuatorState::new();
    dispatch(b"S-30", &state).unwrap();
    assert_eq!(state.steer_target(), -30);
    assert_eq!(state.drive_target(), 0);
}

#[test]
fn unknown_opcode_leaves_targets_alone() {
    let state = ActuatorState::new();
    state.set_drive_target(10);
    state.set_steer_target(-5);

    assert_eq!(dispatch(b"Q99", &state), Err(CommandError::UnrecognizedOpcode(b'Q')));
    assert_eq!(state.drive_target(), 10);
    assert_eq!(state.steer_target(), -5);
}

#[test]
fn lowercase_opcode_is_not_recognised() {
    assert_eq!(decode(b"p50"), Err(CommandError::UnrecognizedOpcode(b'p')));
}

#[test]
fn operand_uses_numeric_prefix() {
    assert_eq!(decode(b"P42abc").unwrap().operand, 42);
    assert_eq!(decode(b"P 7").unwrap().operand, 7);
    assert_eq!(decode(b"S+12").unwrap().operand, 12);
}

#[test]
fn non_numeric_operand_reads_as_zero() {
    assert_eq!(decode(b"Pxyz").unwrap().operand, 0);
    assert_eq!(decode(b"S").unwrap().operand, 0);
    assert_eq!(decode(b"P-").unwrap().operand, 0);
}

#[test]
fn command_ends_at_nul() {
    assert_eq!(decode(b"P25\0\0\0garbage").unwrap().operand, 25);
    assert_eq!(decode(b"\0P25"), Err(CommandError::Empty));
}

#[test]
fn empty_and_oversized_commands_are_rejected() {
    assert_eq!(decode(b""), Err(CommandError::Empty));
    let long = [b'1'; MAX_COMMAND_LEN + 1];
    assert_eq!(decode(&long), Err(CommandError::TooLong(MAX_COMMAND_LEN + 1)));

    let mut max = [b'0'; MAX_COMMAND_LEN];
    max[0] = b'P';
    assert_eq!(decode(&max).unwrap().operand, 0);
}

#[test]
fn operand_saturates_instead_of_overflowing() {
    assert_eq!(parse_operand(b"99999999999999").value, i32::MAX);
    assert_eq!(parse_operand(b"-99999999999999").value, i32::MIN);
}

#[test]
fn operand_well_formedness() {
    assert!(parse_operand(b"-30").well_formed);
    assert!(!parse_operand(b"30x").well_formed);
    assert!(!parse_operand(b"").well_formed);
}

#[test]
fn operand_skips_any_leading_whitespace() {
    let operand = parse_operand(b"\n\r\x0b\x0c\t 42");
    assert_eq!(operand.value, 42);
    assert_eq!(operand.digits, 2);
    assert!(operand.well_formed);
    assert_eq!(decode(b"P\r\n-7").unwrap().operand, -7);
}

#[test]
fn targets_are_clamped_to_logical_range() {
    let state = ActuatorState::new();
    dispatch(b"P250", &state).unwrap();
    dispatch(b"S-120", &state).unwrap();
    assert_eq!(state.drive_target(), 100);
    assert_eq!(state.steer_target(), -90);
}

#[test]
fn shell_lines_parse_into_maneuvers() {
    assert_eq!(
        ManeuverCommand::parse("drive 50 2 0"),
        Ok(ManeuverCommand::Drive { r: 0, p: 50, d: 2 })
    );
    assert_eq!(
        ManeuverCommand::parse("interp 0 100 10 51"),
        Ok(ManeuverCommand::Interp {
            r: 0x33,
            s: 0,
            e: 100,
            t: 10
        })
    );
    assert_eq!(
        ManeuverCommand::parse("  steer -20   20 "),
        Ok(ManeuverCommand::Steer { s: -20, e: 20 })
    );
}

#[test]
fn shell_arguments_use_numeric_prefix() {
    assert_eq!(
        ManeuverCommand::parse("drive 50 2 0x33"),
        Ok(ManeuverCommand::Drive { r: 0, p: 50, d: 2 })
    );
    assert_eq!(
        ManeuverCommand::parse("drive 50% 2s 51"),
        Ok(ManeuverCommand::Drive { r: 0x33, p: 50, d: 2 })
    );
    assert_eq!(
        ManeuverCommand::parse("drive 50 2 300"),
        Err(ManeuverParseError::InvalidArgument("register"))
    );
    assert_eq!(
        ManeuverCommand::parse("drive 50 -2 0"),
        Err(ManeuverParseError::InvalidArgument("duration"))
    );
}

#[test]
fn bad_shell_lines_are_rejected() {
    assert_eq!(ManeuverCommand::parse(""), Err(ManeuverParseError::Empty));
    assert_eq!(ManeuverCommand::parse("monkey"), Err(ManeuverParseError::UnknownCommand));
    assert_eq!(
        ManeuverCommand::parse("drive 50"),
        Err(ManeuverParseError::MissingArgument("duration"))
    );
    assert_eq!(
        ManeuverCommand::parse("steer left 20"),
        Err(ManeuverParseError::InvalidArgument("start"))
    );
    assert_eq!(
        ManeuverCommand::parse("steer 1 2 3"),
        Err(ManeuverParseError::TrailingArguments)
    );
}

#[test]
fn json_maneuvers_deserialize() {
    let cmd = ManeuverCommand::from_json(br#"{"mc":"interp","r":0,"s":100,"e":0,"t":20}"#).unwrap();
    assert_eq!(
        cmd,
        ManeuverCommand::Interp {
            r: 0,
            s: 100,
            e: 0,
            t: 20
        }
    );
    assert!(ManeuverCommand::from_json(br#"{"mc":"fly"}"#).is_err());
}

#[test]
fn maneuvers_queue_on_channel() {
    let cmd = ManeuverCommand::Steer { s: 0, e: 45 };
    MANEUVER_CHANNEL.try_send(cmd).unwrap();
    assert_eq!(MANEUVER_CHANNEL.try_receive().unwrap(), cmd);
}
