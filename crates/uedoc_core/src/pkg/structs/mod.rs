use crate::pkg::bytes::Cursor;
use crate::pkg::{FieldSet, NameTable, Result, StructValue, Value};

/// How a registered struct type is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructLayout {
	/// Native binary layout with a dedicated decoder.
	Fixed(FixedStruct),
	/// Payload skipped by declared size.
	Skip,
}

/// Struct types with a native binary layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedStruct {
	/// `X, Y, Z: f32`.
	Vector,
	/// `X, Y: f32`.
	Vector2D,
	/// `X, Y, Z, W: f32`.
	Vector4,
	/// `X, Y: i32`.
	IntPoint,
	/// `Pitch, Yaw, Roll: f32`.
	Rotator,
	/// `X, Y, Z, W: f32`.
	Quat,
	/// `R, G, B, A: u8`.
	Color,
	/// `R, G, B, A: f32`.
	LinearColor,
	/// Four `u32` words.
	Guid,
	/// Three `u8` mode enums followed by six `f32`.
	RichCurveKey,
	/// `Value: i32`.
	FrameNumber,
	/// Lower and upper frame bounds.
	MovieSceneFrameRange,
	/// `i32` count of tag names.
	GameplayTagContainer,
	/// Asset path name plus sub-path string.
	SoftObjectPath,
}

const SKIPPED: &[&str] = &[
	"MovieSceneFloatChannel",
	"MovieSceneEvaluationKey",
	"MovieSceneEvaluationTemplate",
	"MovieSceneSequenceID",
	"MovieSceneTrackIdentifier",
	"MovieSceneEvaluationFieldEntityTree",
	"ColorMaterialInput",
	"DateTime",
	"Timespan",
	"Box2D",
	"KeyHandleMap",
];

const INTERP_MODES: &[&str] = &["RCIM_Linear", "RCIM_Constant", "RCIM_Cubic", "RCIM_None"];
const TANGENT_MODES: &[&str] = &["RCTM_Auto", "RCTM_User", "RCTM_Break", "RCTM_None"];
const TANGENT_WEIGHT_MODES: &[&str] = &["RCTWM_WeightedNone", "RCTWM_WeightedArrive", "RCTWM_WeightedLeave", "RCTWM_WeightedBoth"];
const RANGE_BOUND_TYPES: &[&str] = &["Exclusive", "Inclusive", "Open"];

/// Registered layout for `struct_name`, if any.
pub fn lookup(struct_name: &str) -> Option<StructLayout> {
	let fixed = match struct_name {
		"Vector" => FixedStruct::Vector,
		"Vector2D" => FixedStruct::Vector2D,
		"Vector4" => FixedStruct::Vector4,
		"IntPoint" => FixedStruct::IntPoint,
		"Rotator" => FixedStruct::Rotator,
		"Quat" => FixedStruct::Quat,
		"Color" => FixedStruct::Color,
		"LinearColor" => FixedStruct::LinearColor,
		"Guid" => FixedStruct::Guid,
		"RichCurveKey" => FixedStruct::RichCurveKey,
		"FrameNumber" => FixedStruct::FrameNumber,
		"MovieSceneFrameRange" => FixedStruct::MovieSceneFrameRange,
		"GameplayTagContainer" => FixedStruct::GameplayTagContainer,
		"SoftObjectPath" => FixedStruct::SoftObjectPath,
		other if SKIPPED.contains(&other) => return Some(StructLayout::Skip),
		_ => return None,
	};
	Some(StructLayout::Fixed(fixed))
}

impl FixedStruct {
	/// Decode one instance at the cursor.
	pub fn decode(self, cursor: &mut Cursor<'_>, names: &NameTable, type_name: &str) -> Result<StructValue> {
		let mut fields = FieldSet::new();
		match self {
			Self::Vector => read_f32s(cursor, &mut fields, &["X", "Y", "Z"])?,
			Self::Vector2D => read_f32s(cursor, &mut fields, &["X", "Y"])?,
			Self::Vector4 | Self::Quat => read_f32s(cursor, &mut fields, &["X", "Y", "Z", "W"])?,
			Self::LinearColor => read_f32s(cursor, &mut fields, &["R", "G", "B", "A"])?,
			Self::Rotator => read_f32s(cursor, &mut fields, &["Pitch", "Yaw", "Roll"])?,
			Self::IntPoint => {
				fields.insert("X", Value::I64(i64::from(cursor.read_i32()?)))?;
				fields.insert("Y", Value::I64(i64::from(cursor.read_i32()?)))?;
			}
			Self::Color => {
				for channel in ["R", "G", "B", "A"] {
					fields.insert(channel, Value::U64(u64::from(cursor.read_u8()?)))?;
				}
			}
			Self::Guid => {
				for word in ["A", "B", "C", "D"] {
					fields.insert(word, Value::U64(u64::from(cursor.read_u32()?)))?;
				}
			}
			Self::RichCurveKey => {
				fields.insert("InterpMode", enum_symbol(cursor.read_u8()?, INTERP_MODES, "ERichCurveInterpMode"))?;
				fields.insert("TangentMode", enum_symbol(cursor.read_u8()?, TANGENT_MODES, "ERichCurveTangentMode"))?;
				fields.insert(
					"TangentWeightMode",
					enum_symbol(cursor.read_u8()?, TANGENT_WEIGHT_MODES, "ERichCurveTangentWeightMode"),
				)?;
				read_f32s(
					cursor,
					&mut fields,
					&["Time", "Value", "ArriveTangent", "ArriveTangentWeight", "LeaveTangent", "LeaveTangentWeight"],
				)?;
			}
			Self::FrameNumber => {
				fields.insert("Value", Value::I64(i64::from(cursor.read_i32()?)))?;
			}
			Self::MovieSceneFrameRange => {
				for bound in ["LowerBound", "UpperBound"] {
					let mut inner = FieldSet::new();
					inner.insert("Type", enum_symbol(cursor.read_u8()?, RANGE_BOUND_TYPES, "ERangeBoundTypes"))?;
					inner.insert("Value", Value::I64(i64::from(cursor.read_i32()?)))?;
					fields.insert(
						bound,
						Value::Struct(StructValue {
							type_name: "FrameNumberRangeBound".to_owned(),
							fixed: true,
							fields: inner,
						}),
					)?;
				}
			}
			Self::GameplayTagContainer => {
				let count = cursor.read_i32()?.max(0);
				let mut tags = Vec::new();
				for _ in 0..count {
					tags.push(Value::Name(names.read(cursor)?));
				}
				fields.insert("GameplayTags", Value::List(tags))?;
			}
			Self::SoftObjectPath => {
				fields.insert("AssetPathName", Value::Name(names.read(cursor)?))?;
				fields.insert("SubPathString", Value::Str(cursor.read_fstring()?))?;
			}
		}
		Ok(StructValue {
			type_name: type_name.to_owned(),
			fixed: true,
			fields,
		})
	}
}

fn read_f32s(cursor: &mut Cursor<'_>, fields: &mut FieldSet, names: &[&str]) -> Result<()> {
	for name in names {
		fields.insert(*name, Value::F32(cursor.read_f32()?))?;
	}
	Ok(())
}

fn enum_symbol(raw: u8, symbols: &[&str], enum_name: &str) -> Value {
	match symbols.get(usize::from(raw)) {
		Some(symbol) => Value::Enum((*symbol).to_owned()),
		None => Value::Enum(format!("{enum_name}({raw})")),
	}
}
