//! Artifact templates
//!
//! Every template renders against the context built by
//! [`super::context::table_context`]: the resolved `table`, its single `pk`,
//! flattened relation edges and precomputed form and path lookups.

/// Go type of a column, `*gtime.Time` for dates and times
pub const GO_TYPE_PARTIAL: &str = r#"{{#if (eq goType "Time")}}*gtime.Time{{else}}{{goType}}{{/if}}"#;

/// Struct declarations for every related edge, inner edges included
pub const RELATED_STRUCTS_PARTIAL: &str = r#"{{#each relatedStructs}}
// {{edge.classNameWhenRelated}} is the {{edge.tableName}} record joined to the list
type {{edge.classNameWhenRelated}} struct {
	g.Meta `orm:"table:{{edge.tableName}}"`
{{#each refColumns}}
	{{goField}} {{> go_type}} `orm:"{{name}}" json:"{{htmlField}}"`
{{/each}}
{{#each inner}}
	{{classNameWhenRelated}} *{{classNameWhenRelated}} `{{#if ormWithMapping}}{{ormWithMapping}} {{/if}}json:"{{jsonNameWhenRelated}}"`
{{/each}}
}
{{/each}}"#;

/// Element Plus form widget for an add or edit column
pub const FORM_WIDGET_PARTIAL: &str = r#"{{#if (eq htmlType "textarea")}}
          <el-input v-model="form.{{htmlField}}" type="textarea" placeholder="{{comment}}" />
{{else}}{{#if (eq htmlType "select")}}
          <el-select v-model="form.{{htmlField}}" placeholder="{{comment}}" clearable>
            <el-option v-for="item in options.{{htmlField}}" :key="item.value" :label="item.label" :value="item.value" />
          </el-select>
{{else}}{{#if (eq htmlType "radio")}}
          <el-radio-group v-model="form.{{htmlField}}">
            <el-radio v-for="item in options.{{htmlField}}" :key="item.value" :label="item.value" v-text="item.label" />
          </el-radio-group>
{{else}}{{#if (eq htmlType "checkbox")}}
          <el-checkbox-group v-model="form.{{htmlField}}">
            <el-checkbox v-for="item in options.{{htmlField}}" :key="item.value" :label="item.value" v-text="item.label" />
          </el-checkbox-group>
{{else}}{{#if (eq htmlType "date")}}
          <el-date-picker v-model="form.{{htmlField}}" type="date" value-format="YYYY-MM-DD" placeholder="{{comment}}" clearable />
{{else}}{{#if (eq htmlType "datetime")}}
          <el-date-picker v-model="form.{{htmlField}}" type="datetime" value-format="YYYY-MM-DD HH:mm:ss" placeholder="{{comment}}" clearable />
{{else}}{{#if (contains_i htmlType "image")}}
          <image-upload v-model="form.{{htmlField}}" />
{{else}}{{#if (contains_i htmlType "file")}}
          <file-upload v-model="form.{{htmlField}}" />
{{else}}{{#if (eq htmlType "richtext")}}
          <editor v-model="form.{{htmlField}}" :min-height="192" />
{{else}}
          <el-input v-model="form.{{htmlField}}" placeholder="{{comment}}"{{#if disabled}} :disabled="form.{{htmlField}} !== undefined"{{/if}} />
{{/if}}{{/if}}{{/if}}{{/if}}{{/if}}{{/if}}{{/if}}{{/if}}{{/if}}"#;

/// Non-zero test on a request field, by Go type
pub const NON_ZERO_PARTIAL: &str = r#"{{#if (eq goType "string")}}req.{{goField}} != ""{{else}}{{#if (eq goType "Time")}}req.{{goField}} != nil{{else}}{{#if (eq goType "bool")}}req.{{goField}}{{else}}req.{{goField}} != 0{{/if}}{{/if}}{{/if}}"#;

/// Table entity
pub const ENTITY_TEMPLATE: &str = r#"// ==========================================================================
// Code generated by crudgen. DO NOT EDIT.
// ==========================================================================

package entity

{{#if table.hasTimeColumnInMain}}
import "github.com/gogf/gf/v2/os/gtime"
{{/if}}

// {{table.className}} is the golang structure for table {{table.name}}.
type {{table.className}} struct {
{{#each table.columns}}
	{{goField}} {{> go_type}} `orm:"{{name}}{{#if isPk}},primary{{/if}}" json:"{{htmlField}}"` // {{comment}}
{{/each}}
}
"#;

/// Internal DAO with column names
pub const DAO_INTERNAL_TEMPLATE: &str = r#"// ==========================================================================
// Code generated by crudgen. DO NOT EDIT.
// ==========================================================================

package internal

import (
	"context"

	"github.com/gogf/gf/v2/database/gdb"
	"github.com/gogf/gf/v2/frame/g"
)

// {{table.className}}Dao is the data access object for table {{table.name}}.
type {{table.className}}Dao struct {
	table   string
	group   string
	columns {{table.className}}Columns
}

// {{table.className}}Columns defines and stores column names for table {{table.name}}.
type {{table.className}}Columns struct {
{{#each table.columns}}
	{{goField}} string // {{comment}}
{{/each}}
}

var {{table.structName}}Columns = {{table.className}}Columns{
{{#each table.columns}}
	{{goField}}: "{{name}}",
{{/each}}
}

// New{{table.className}}Dao creates and returns a new DAO object for table data access.
func New{{table.className}}Dao() *{{table.className}}Dao {
	return &{{table.className}}Dao{
		group:   "default",
		table:   "{{table.name}}",
		columns: {{table.structName}}Columns,
	}
}

// DB retrieves and returns the underlying raw database management object of current DAO.
func (dao *{{table.className}}Dao) DB() gdb.DB {
	return g.DB(dao.group)
}

// Table returns the table name of current dao.
func (dao *{{table.className}}Dao) Table() string {
	return dao.table
}

// Columns returns all column names of current dao.
func (dao *{{table.className}}Dao) Columns() {{table.className}}Columns {
	return dao.columns
}

// Group returns the configuration group name of database of current dao.
func (dao *{{table.className}}Dao) Group() string {
	return dao.group
}

// Ctx creates and returns the Model for current DAO, It automatically sets the context for current operation.
func (dao *{{table.className}}Dao) Ctx(ctx context.Context) *gdb.Model {
	return dao.DB().Model(dao.table).Safe().Ctx(ctx)
}

// Transaction wraps the transaction logic using function f.
func (dao *{{table.className}}Dao) Transaction(ctx context.Context, f func(ctx context.Context, tx gdb.TX) error) (err error) {
	return dao.Ctx(ctx).Transaction(ctx, f)
}
"#;

/// Public DAO wrapper, safe to extend by hand
pub const DAO_TEMPLATE: &str = r#"package dao

import (
	"{{importBase}}/service/internal/dao/internal"
)

// internal{{table.className}}Dao is internal type for wrapping internal DAO implements.
type internal{{table.className}}Dao = *internal.{{table.className}}Dao

// {{table.structName}}Dao is the data access object for table {{table.name}}.
// Custom methods can be defined on it to extend its functionality.
type {{table.structName}}Dao struct {
	internal{{table.className}}Dao
}

var (
	// {{table.className}} is the globally accessible object for table {{table.name}} operations.
	{{table.className}} = {{table.structName}}Dao{
		internal.New{{table.className}}Dao(),
	}
)
"#;

/// Request, response and joined record types
pub const MODEL_TEMPLATE: &str = r#"// ==========================================================================
// Code generated by crudgen. DO NOT EDIT.
// ==========================================================================

package model

{{#if related}}
import (
	"github.com/gogf/gf/v2/frame/g"
{{#if table.hasTimeColumn}}
	"github.com/gogf/gf/v2/os/gtime"
{{/if}}
)
{{else}}
{{#if table.hasTimeColumnInMain}}
import "github.com/gogf/gf/v2/os/gtime"
{{/if}}
{{/if}}

// {{table.className}}ListReq filters the {{table.functionName}} list
type {{table.className}}ListReq struct {
{{#each table.queryColumns}}
	{{goField}} {{#if (eq queryType "BETWEEN")}}[]{{/if}}{{> go_type}} `json:"{{htmlField}}"{{#if fieldValidation}} v:"{{fieldValidation}}"{{/if}}` // {{comment}}
{{/each}}
{{#unless isTree}}
	PageNum  int    `json:"pageNum" d:"1" v:"min:0#page number must not be negative"`
	PageSize int    `json:"pageSize" d:"10" v:"max:500#page size must not exceed 500"`
{{/unless}}
	OrderBy  string `json:"orderBy"`
}

// {{table.className}}ListRes is one page of {{table.functionName}}
type {{table.className}}ListRes struct {
{{#unless isTree}}
	Total int `json:"total"`
{{/unless}}
	List []*{{table.className}}Item `json:"list"`
}

// {{table.className}}Item is one {{table.functionName}} record with its joined tables
type {{table.className}}Item struct {
{{#each itemColumns}}
	{{goField}} {{> go_type}} `orm:"{{name}}" json:"{{htmlField}}"` // {{comment}}
{{/each}}
{{#each related}}
	{{edge.classNameWhenRelated}} *{{edge.classNameWhenRelated}} `{{#if edge.ormWithMapping}}{{edge.ormWithMapping}} {{/if}}json:"{{edge.jsonNameWhenRelated}}"`
{{/each}}
}
{{> related_structs}}

// {{table.className}}AddReq creates a {{table.functionName}}
type {{table.className}}AddReq struct {
{{#each addFields}}
	{{goField}} {{> go_type}} `json:"{{htmlField}}"{{#if required}} v:"required#{{comment}} is required"{{/if}}` // {{comment}}
{{/each}}
{{#if table.hasCreatedBy}}
	CreatedBy uint64 `json:"-"`
{{/if}}
}

// {{table.className}}EditReq updates a {{table.functionName}}
type {{table.className}}EditReq struct {
{{#each editFields}}
	{{goField}} {{> go_type}} `json:"{{htmlField}}"{{#if required}} v:"required#{{comment}} is required"{{/if}}` // {{comment}}
{{/each}}
{{#if table.hasUpdatedBy}}
	UpdatedBy uint64 `json:"-"`
{{/if}}
}

// {{table.className}}DeleteReq deletes {{table.functionName}} records
type {{table.className}}DeleteReq struct {
	Ids []{{#if pk}}{{pk.goType}}{{else}}string{{/if}} `json:"ids" v:"required#ids are required"`
}
"#;

/// Business logic over the DAO
pub const SERVICE_TEMPLATE: &str = r#"package service

import (
	"context"

	"{{importBase}}/model"
	"{{importBase}}/service/internal/dao"
)

type s{{table.className}} struct{}

// {{table.className}} implements {{table.functionName}} operations
var {{table.className}} = s{{table.className}}{}

// List returns {{#if isTree}}every{{else}}one page of{{/if}} {{table.functionName}} matching the filters
func (s s{{table.className}}) List(ctx context.Context, req *model.{{table.className}}ListReq) (res *model.{{table.className}}ListRes, err error) {
	res = &model.{{table.className}}ListRes{}
	m := dao.{{table.className}}.Ctx(ctx){{#if related}}.WithAll(){{/if}}
	columns := dao.{{table.className}}.Columns()
{{#each physicalQueries}}
{{#if (eq queryType "BETWEEN")}}
	if len(req.{{goField}}) == 2 {
		m = m.WhereBetween(columns.{{goField}}, req.{{goField}}[0], req.{{goField}}[1])
	}
{{else}}
	if {{> non_zero}} {
{{#if (eq queryType "LIKE")}}
		m = m.WhereLike(columns.{{goField}}, "%"+req.{{goField}}+"%")
{{else}}
		m = m.Where(columns.{{goField}}, req.{{goField}})
{{/if}}
	}
{{/if}}
{{/each}}
{{#each virtualQueries}}
	if {{> non_zero}} {
		m = m.WhereIn(columns.{{keyGoField}}, dao.{{@root.table.className}}.DB().Model("{{foreignTable}}").Fields("{{foreignPk}}"){{#if (eq queryType "LIKE")}}.WhereLike("{{valueColumn}}", "%"+req.{{goField}}+"%"){{else}}.Where("{{valueColumn}}", req.{{goField}}){{/if}})
	}
{{/each}}
	orderBy := req.OrderBy
	if orderBy == "" {
		orderBy = "{{table.sortColumn}} {{table.sortType}}"
	}
{{#if isTree}}
	err = m.Order(orderBy).Scan(&res.List)
{{else}}
	if res.Total, err = m.Count(); err != nil {
		return nil, err
	}
	err = m.Page(req.PageNum, req.PageSize).Order(orderBy).Scan(&res.List)
{{/if}}
	return
}

{{#if pk}}
// Get returns one {{table.functionName}} by primary key
func (s s{{table.className}}) Get(ctx context.Context, id {{pk.goType}}) (res *model.{{table.className}}Item, err error) {
	err = dao.{{table.className}}.Ctx(ctx){{#if related}}.WithAll(){{/if}}.WherePri(id).Scan(&res)
	return
}
{{/if}}

// Add creates a {{table.functionName}}
func (s s{{table.className}}) Add(ctx context.Context, req *model.{{table.className}}AddReq) (err error) {
	_, err = dao.{{table.className}}.Ctx(ctx).Data(req).OmitEmpty().Insert()
	return
}

// Edit updates a {{table.functionName}}
func (s s{{table.className}}) Edit(ctx context.Context, req *model.{{table.className}}EditReq) (err error) {
	_, err = dao.{{table.className}}.Ctx(ctx).Data(req).OmitNil(){{#if pk}}.WherePri(req.{{pk.goField}}){{/if}}.Update()
	return
}

// Delete removes {{table.functionName}} records
func (s s{{table.className}}) Delete(ctx context.Context, req *model.{{table.className}}DeleteReq) (err error) {
	_, err = dao.{{table.className}}.Ctx(ctx).WhereIn(dao.{{table.className}}.Columns().{{#if pk}}{{pk.goField}}{{else}}Id{{/if}}, req.Ids).Delete()
	return
}
"#;

/// HTTP controller
pub const API_TEMPLATE: &str = r#"package api

import (
	"context"

	"github.com/gogf/gf/v2/frame/g"

	"{{importBase}}/model"
	"{{importBase}}/service"
)

type (
	{{table.className}}ListReq struct {
		g.Meta `path:"/list" method:"get" tags:"{{table.functionName}}" summary:"List {{table.functionName}}"`
		model.{{table.className}}ListReq
	}
	{{table.className}}ListRes struct {
		*model.{{table.className}}ListRes
	}
{{#if pk}}
	{{table.className}}GetReq struct {
		g.Meta `path:"/get" method:"get" tags:"{{table.functionName}}" summary:"Get {{table.functionName}}"`
		{{pk.goField}} {{pk.goType}} `json:"{{pk.htmlField}}" v:"required#{{pk.comment}} is required"`
	}
	{{table.className}}GetRes struct {
		*model.{{table.className}}Item
	}
{{/if}}
	{{table.className}}AddReq struct {
		g.Meta `path:"/add" method:"post" tags:"{{table.functionName}}" summary:"Add {{table.functionName}}"`
		model.{{table.className}}AddReq
	}
	{{table.className}}EditReq struct {
		g.Meta `path:"/edit" method:"put" tags:"{{table.functionName}}" summary:"Edit {{table.functionName}}"`
		model.{{table.className}}EditReq
	}
	{{table.className}}DeleteReq struct {
		g.Meta `path:"/delete" method:"delete" tags:"{{table.functionName}}" summary:"Delete {{table.functionName}}"`
		model.{{table.className}}DeleteReq
	}
	{{table.className}}EmptyRes struct{}
)

type {{table.structName}}Api struct{}

// {{table.className}} serves {{table.functionName}} requests
var {{table.className}} = {{table.structName}}Api{}

func (a {{table.structName}}Api) List(ctx context.Context, req *{{table.className}}ListReq) (res *{{table.className}}ListRes, err error) {
	out, err := service.{{table.className}}.List(ctx, &req.{{table.className}}ListReq)
	if err != nil {
		return nil, err
	}
	return &{{table.className}}ListRes{out}, nil
}

{{#if pk}}
func (a {{table.structName}}Api) Get(ctx context.Context, req *{{table.className}}GetReq) (res *{{table.className}}GetRes, err error) {
	out, err := service.{{table.className}}.Get(ctx, req.{{pk.goField}})
	if err != nil {
		return nil, err
	}
	return &{{table.className}}GetRes{out}, nil
}
{{/if}}

func (a {{table.structName}}Api) Add(ctx context.Context, req *{{table.className}}AddReq) (res *{{table.className}}EmptyRes, err error) {
	err = service.{{table.className}}.Add(ctx, &req.{{table.className}}AddReq)
	return
}

func (a {{table.structName}}Api) Edit(ctx context.Context, req *{{table.className}}EditReq) (res *{{table.className}}EmptyRes, err error) {
	err = service.{{table.className}}.Edit(ctx, &req.{{table.className}}EditReq)
	return
}

func (a {{table.structName}}Api) Delete(ctx context.Context, req *{{table.className}}DeleteReq) (res *{{table.className}}EmptyRes, err error) {
	err = service.{{table.className}}.Delete(ctx, &req.{{table.className}}DeleteReq)
	return
}
"#;

/// Route registration of the controller
pub const ROUTER_TEMPLATE: &str = r#"package router

import (
	"github.com/gogf/gf/v2/frame/g"
	"github.com/gogf/gf/v2/net/ghttp"

	"{{importBase}}/api"
)

func init() {
	s := g.Server()
	s.Group("{{routePrefix}}", func(group *ghttp.RouterGroup) {
		group.Middleware(ghttp.MiddlewareHandlerResponse)
		group.Group("/{{table.routeChildPath}}", func(group *ghttp.RouterGroup) {
			group.Bind(api.{{table.className}})
		})
	})
}
"#;

/// Protocol buffer service definition
pub const PROTOBUF_TEMPLATE: &str = r#"// ==========================================================================
// Code generated by crudgen. DO NOT EDIT.
// ==========================================================================

syntax = "proto3";

package {{table.packageNameProto}};

option go_package = "./{{packageBase}}/model;model";

service {{table.className}} {
  rpc List({{table.className}}ListReq) returns ({{table.className}}ListRes);
{{#if pk}}
  rpc Get({{table.className}}GetReq) returns ({{table.className}}Item);
{{/if}}
  rpc Add({{table.className}}AddReq) returns ({{table.className}}EmptyRes);
  rpc Edit({{table.className}}EditReq) returns ({{table.className}}EmptyRes);
  rpc Delete({{table.className}}DeleteReq) returns ({{table.className}}EmptyRes);
}

message {{table.className}}ListReq {
{{#each table.queryColumns}}
  {{#if (eq queryType "BETWEEN")}}repeated {{/if}}{{lookup @root.protoTypes name}} {{htmlField}} = {{sum @index 1}}; // {{comment}}
{{/each}}
  int32 pageNum = {{sum queryCount 1}};
  int32 pageSize = {{sum queryCount 2}};
  string orderBy = {{sum queryCount 3}};
}

message {{table.className}}ListRes {
  int32 total = 1;
  repeated {{table.className}}Item list = 2;
}

message {{table.className}}Item {
{{#each itemColumns}}
  {{protoType}} {{htmlField}} = {{sum @index 1}}; // {{comment}}
{{/each}}
}

{{#if pk}}
message {{table.className}}GetReq {
  {{pk.protoType}} {{pk.htmlField}} = 1;
}
{{/if}}

message {{table.className}}AddReq {
{{#each addFields}}
  {{protoType}} {{htmlField}} = {{sum @index 1}}; // {{comment}}
{{/each}}
}

message {{table.className}}EditReq {
{{#each editFields}}
  {{protoType}} {{htmlField}} = {{sum @index 1}}; // {{comment}}
{{/each}}
}

message {{table.className}}DeleteReq {
  repeated {{#if pk}}{{pk.protoType}}{{else}}string{{/if}} ids = 1;
}

message {{table.className}}EmptyRes {}
"#;

/// Triple RPC provider delegating to the service
pub const PROVIDER_TEMPLATE: &str = r#"package provider

import (
	"context"

	"dubbo.apache.org/dubbo-go/v3/config"

	"{{importBase}}/model"
	"{{importBase}}/service"
)

// {{table.className}}RpcPort is the port the {{table.functionName}} provider listens on
const {{table.className}}RpcPort = {{table.rpcPort}}

type {{table.className}}Provider struct {
	model.Unimplemented{{table.className}}Server
}

func init() {
	config.SetProviderService(&{{table.className}}Provider{})
}

func (p *{{table.className}}Provider) List(ctx context.Context, req *model.{{table.className}}ListReq) (*model.{{table.className}}ListRes, error) {
	return service.{{table.className}}.List(ctx, req)
}

{{#if pk}}
func (p *{{table.className}}Provider) Get(ctx context.Context, req *model.{{table.className}}GetReq) (*model.{{table.className}}Item, error) {
	return service.{{table.className}}.Get(ctx, req.{{pk.goField}})
}
{{/if}}

func (p *{{table.className}}Provider) Add(ctx context.Context, req *model.{{table.className}}AddReq) (*model.{{table.className}}EmptyRes, error) {
	return &model.{{table.className}}EmptyRes{}, service.{{table.className}}.Add(ctx, req)
}

func (p *{{table.className}}Provider) Edit(ctx context.Context, req *model.{{table.className}}EditReq) (*model.{{table.className}}EmptyRes, error) {
	return &model.{{table.className}}EmptyRes{}, service.{{table.className}}.Edit(ctx, req)
}

func (p *{{table.className}}Provider) Delete(ctx context.Context, req *model.{{table.className}}DeleteReq) (*model.{{table.className}}EmptyRes, error) {
	return &model.{{table.className}}EmptyRes{}, service.{{table.className}}.Delete(ctx, req)
}
"#;

/// Menu and permission rows for the admin frontend
pub const SQL_TEMPLATE: &str = r#"/*
 * {{table.functionName}} menu, generated by crudgen
 * Author: {{table.functionAuthor}}
 */
SELECT @now := NOW();

INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `path`, `component`, `weigh`, `created_at`, `updated_at`)
VALUES (0, '{{routePrefix}}/{{table.routeChildPath}}', '{{table.functionName}}', 1, '{{viewPath}}', '{{viewComponent}}', 0, @now, @now);

-- parent row of the operations below
SELECT @parentId := LAST_INSERT_ID();

INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `weigh`, `created_at`, `updated_at`)
VALUES (@parentId, '{{routePrefix}}/{{table.routeChildPath}}/list', '{{table.functionName}} list', 2, 0, @now, @now);
{{#if pk}}
INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `weigh`, `created_at`, `updated_at`)
VALUES (@parentId, '{{routePrefix}}/{{table.routeChildPath}}/get', '{{table.functionName}} detail', 2, 0, @now, @now);
{{/if}}
INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `weigh`, `created_at`, `updated_at`)
VALUES (@parentId, '{{routePrefix}}/{{table.routeChildPath}}/add', '{{table.functionName}} add', 2, 0, @now, @now);
INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `weigh`, `created_at`, `updated_at`)
VALUES (@parentId, '{{routePrefix}}/{{table.routeChildPath}}/edit', '{{table.functionName}} edit', 2, 0, @now, @now);
INSERT INTO `sys_menu` (`parent_id`, `name`, `title`, `menu_type`, `weigh`, `created_at`, `updated_at`)
VALUES (@parentId, '{{routePrefix}}/{{table.routeChildPath}}/delete', '{{table.functionName}} delete', 2, 0, @now, @now);
"#;

/// Frontend API client
pub const JS_API_TEMPLATE: &str = r#"import request from '@/utils/request'

// List {{table.functionName}}
export function list{{table.className}}(query) {
  return request({
    url: '{{routePrefix}}/{{table.routeChildPath}}/list',
    method: 'get',
    params: query
  })
}
{{#if pk}}

// Get one {{table.functionName}}
export function get{{table.className}}({{pk.htmlField}}) {
  return request({
    url: '{{routePrefix}}/{{table.routeChildPath}}/get',
    method: 'get',
    params: { {{pk.htmlField}} }
  })
}
{{/if}}

// Add {{table.functionName}}
export function add{{table.className}}(data) {
  return request({
    url: '{{routePrefix}}/{{table.routeChildPath}}/add',
    method: 'post',
    data: data
  })
}

// Edit {{table.functionName}}
export function update{{table.className}}(data) {
  return request({
    url: '{{routePrefix}}/{{table.routeChildPath}}/edit',
    method: 'put',
    data: data
  })
}

// Delete {{table.functionName}}
export function del{{table.className}}(ids) {
  return request({
    url: '{{routePrefix}}/{{table.routeChildPath}}/delete',
    method: 'delete',
    data: { ids: ids }
  })
}
"#;

/// Query form shared by the list and tree pages
pub const QUERY_FORM_PARTIAL: &str = r#"    <el-form ref="queryRef" :model="queryParams" :inline="true" v-show="showSearch">
{{#each table.queryColumns}}
      <el-form-item label="{{comment}}" prop="{{htmlField}}">
{{#if (eq queryType "BETWEEN")}}
        <el-date-picker v-model="queryParams.{{htmlField}}" type="daterange" value-format="YYYY-MM-DD" range-separator="-" />
{{else}}
{{#if (eq htmlType "select")}}
        <el-select v-model="queryParams.{{htmlField}}" placeholder="{{comment}}" clearable>
          <el-option v-for="item in options.{{htmlField}}" :key="item.value" :label="item.label" :value="item.value" />
        </el-select>
{{else}}
        <el-input v-model="queryParams.{{htmlField}}" placeholder="{{comment}}" clearable @keyup.enter="handleQuery" />
{{/if}}
{{/if}}
      </el-form-item>
{{/each}}
      <el-form-item>
        <el-button type="primary" icon="Search" @click="handleQuery">Search</el-button>
        <el-button icon="Refresh" @click="resetQuery">Reset</el-button>
      </el-form-item>
    </el-form>
"#;

/// Add and edit dialog shared by the list and tree pages
pub const FORM_DIALOG_PARTIAL: &str = r#"    <el-dialog :title="title" v-model="open" width="800px" append-to-body>
      <el-form ref="formRef" :model="form" :rules="rules" label-width="120px">
{{#each formFields}}
        <el-form-item label="{{comment}}" prop="{{htmlField}}">
{{> form_widget}}
        </el-form-item>
{{/each}}
      </el-form>
      <template #footer>
        <el-button type="primary" @click="submitForm">Confirm</el-button>
        <el-button @click="open = false">Cancel</el-button>
      </template>
    </el-dialog>
{{#if table.showDetail}}
    <el-dialog title="Detail" v-model="detailOpen" width="800px" append-to-body>
      <el-row>
{{#each table.detailColumns}}
        <el-col :span="{{colSpan}}"{{#if isRowStart}} :offset="0"{{/if}}>
          <el-form-item label="{{comment}}"><span v-text="detail.{{lookup @root.displayFields name}}" /></el-form-item>
        </el-col>
{{/each}}
      </el-row>
    </el-dialog>
{{/if}}
"#;

/// Shared script state and handlers
pub const PAGE_SCRIPT_PARTIAL: &str = r#"const { proxy } = getCurrentInstance()

const rows = ref([])
const open = ref(false)
const detailOpen = ref(false)
const detail = ref({})
const loading = ref(true)
const showSearch = ref(true)
const ids = ref([])
const multiple = ref(true)
const total = ref(0)
const title = ref('')

const data = reactive({
  form: {},
  options: {},
  queryParams: {
{{#unless isTree}}
    pageNum: 1,
    pageSize: 10,
{{/unless}}
{{#each table.queryColumns}}
    {{htmlField}}: undefined,
{{/each}}
  },
  rules: {
{{#each formFields}}
{{#if required}}
    {{htmlField}}: [{ required: true, message: '{{comment}} is required', trigger: 'blur' }],
{{/if}}
{{/each}}
  }
})

const { queryParams, form, options, rules } = toRefs(data)

function reset() {
  form.value = {
{{#each formFields}}
    {{htmlField}}: undefined,
{{/each}}
  }
  proxy.resetForm('formRef')
}

function handleQuery() {
{{#unless isTree}}
  queryParams.value.pageNum = 1
{{/unless}}
  getList()
}

function resetQuery() {
  proxy.resetForm('queryRef')
  handleQuery()
}

function handleSelectionChange(selection) {
  ids.value = selection.map(item => item.{{pkField}})
  multiple.value = !selection.length
}

function handleUpdate(row) {
  reset()
  get{{table.className}}(row.{{pkField}}).then(response => {
    form.value = response.data
    open.value = true
    title.value = 'Edit {{table.functionName}}'
  })
}

function handleDetail(row) {
  get{{table.className}}(row.{{pkField}}).then(response => {
    detail.value = response.data
    detailOpen.value = true
  })
}

function submitForm() {
  proxy.$refs['formRef'].validate(valid => {
    if (!valid) {
      return
    }
    const request = form.value.{{pkField}} !== undefined ? update{{table.className}}(form.value) : add{{table.className}}(form.value)
    request.then(() => {
      proxy.$modal.msgSuccess('Saved')
      open.value = false
      getList()
    })
  })
}

function handleDelete(row) {
  const targets = row && row.{{pkField}} !== undefined ? [row.{{pkField}}] : ids.value
  proxy.$modal.confirm('Delete the selected {{table.functionName}}?').then(() => del{{table.className}}(targets)).then(() => {
    getList()
    proxy.$modal.msgSuccess('Deleted')
  }).catch(() => {})
}
"#;

/// Paged list page
pub const VUE_LIST_TEMPLATE: &str = r#"<template>
  <div class="app-container">
{{> query_form}}
    <el-row :gutter="10" class="mb8">
      <el-col :span="1.5">
        <el-button type="primary" plain icon="Plus" @click="handleAdd">Add</el-button>
      </el-col>
      <el-col :span="1.5">
        <el-button type="danger" plain icon="Delete" :disabled="multiple" @click="handleDelete()">Delete</el-button>
      </el-col>
    </el-row>

    <el-table v-loading="loading" :data="rows" @selection-change="handleSelectionChange">
      <el-table-column type="selection" width="55" align="center" />
{{#each table.listColumns}}
      <el-table-column label="{{comment}}" align="center" prop="{{lookup @root.displayFields name}}" min-width="{{minWidth}}"{{#if isFixed}} fixed{{/if}}{{#if isOverflowTooltip}} show-overflow-tooltip{{/if}} />
{{/each}}
      <el-table-column label="Operations" align="center" class-name="small-padding fixed-width" min-width="160">
        <template #default="scope">
{{#if table.showDetail}}
          <el-button link type="primary" icon="View" @click="handleDetail(scope.row)">Detail</el-button>
{{/if}}
          <el-button link type="primary" icon="Edit" @click="handleUpdate(scope.row)">Edit</el-button>
          <el-button link type="primary" icon="Delete" @click="handleDelete(scope.row)">Delete</el-button>
        </template>
      </el-table-column>
    </el-table>

    <pagination v-show="total > 0" :total="total" v-model:page="queryParams.pageNum" v-model:limit="queryParams.pageSize" @pagination="getList" />

{{> form_dialog}}
  </div>
</template>

<script setup name="{{table.className}}">
import { getCurrentInstance, reactive, ref, toRefs } from 'vue'
import { list{{table.className}}, get{{table.className}}, add{{table.className}}, update{{table.className}}, del{{table.className}} } from '@/api/{{apiPath}}'

{{> page_script}}

function getList() {
  loading.value = true
  list{{table.className}}(queryParams.value).then(response => {
    rows.value = response.data.list
    total.value = response.data.total
    loading.value = false
  })
}

function handleAdd() {
  reset()
  open.value = true
  title.value = 'Add {{table.functionName}}'
}

getList()
</script>
"#;

/// Tree page keyed by the tree code columns
pub const VUE_TREE_TEMPLATE: &str = r#"<template>
  <div class="app-container">
{{> query_form}}
    <el-row :gutter="10" class="mb8">
      <el-col :span="1.5">
        <el-button type="primary" plain icon="Plus" @click="handleAdd()">Add</el-button>
      </el-col>
      <el-col :span="1.5">
        <el-button type="info" plain icon="Sort" @click="toggleExpandAll">Expand</el-button>
      </el-col>
    </el-row>

    <el-table v-if="refreshTable" v-loading="loading" :data="rows" row-key="{{treeCodeField}}" :default-expand-all="isExpandAll" :tree-props="{ children: 'children', hasChildren: 'hasChildren' }">
{{#each table.listColumns}}
      <el-table-column label="{{comment}}" prop="{{lookup @root.displayFields name}}" min-width="{{minWidth}}"{{#if isFixed}} fixed{{/if}}{{#if isOverflowTooltip}} show-overflow-tooltip{{/if}} />
{{/each}}
      <el-table-column label="Operations" align="center" class-name="small-padding fixed-width" min-width="200">
        <template #default="scope">
{{#if table.showDetail}}
          <el-button link type="primary" icon="View" @click="handleDetail(scope.row)">Detail</el-button>
{{/if}}
          <el-button link type="primary" icon="Plus" @click="handleAdd(scope.row)">Add</el-button>
          <el-button link type="primary" icon="Edit" @click="handleUpdate(scope.row)">Edit</el-button>
          <el-button link type="primary" icon="Delete" @click="handleDelete(scope.row)">Delete</el-button>
        </template>
      </el-table-column>
    </el-table>

{{> form_dialog}}
  </div>
</template>

<script setup name="{{table.className}}">
import { getCurrentInstance, nextTick, reactive, ref, toRefs } from 'vue'
import { list{{table.className}}, get{{table.className}}, add{{table.className}}, update{{table.className}}, del{{table.className}} } from '@/api/{{apiPath}}'

{{> page_script}}

const isExpandAll = ref(true)
const refreshTable = ref(true)

function getList() {
  loading.value = true
  list{{table.className}}(queryParams.value).then(response => {
    rows.value = proxy.handleTree(response.data.list, '{{treeCodeField}}', '{{treeParentField}}')
    loading.value = false
  })
}

function handleAdd(row) {
  reset()
  if (row && row.{{treeCodeField}} !== undefined) {
    form.value.{{treeParentField}} = row.{{treeCodeField}}
  }
  open.value = true
  title.value = 'Add {{table.functionName}}'
}

function toggleExpandAll() {
  refreshTable.value = false
  isExpandAll.value = !isExpandAll.value
  nextTick(() => {
    refreshTable.value = true
  })
}

getList()
</script>
"#;

/// Template names and bodies, registered once per renderer
pub const TEMPLATES: &[(&str, &str)] = &[
    ("entity", ENTITY_TEMPLATE),
    ("dao_internal", DAO_INTERNAL_TEMPLATE),
    ("dao", DAO_TEMPLATE),
    ("model", MODEL_TEMPLATE),
    ("service", SERVICE_TEMPLATE),
    ("api", API_TEMPLATE),
    ("router", ROUTER_TEMPLATE),
    ("protobuf", PROTOBUF_TEMPLATE),
    ("provider", PROVIDER_TEMPLATE),
    ("sql", SQL_TEMPLATE),
    ("js_api", JS_API_TEMPLATE),
    ("vue_list", VUE_LIST_TEMPLATE),
    ("vue_tree", VUE_TREE_TEMPLATE),
];

/// Partial names and bodies
pub const PARTIALS: &[(&str, &str)] = &[
    ("go_type", GO_TYPE_PARTIAL),
    ("related_structs", RELATED_STRUCTS_PARTIAL),
    ("form_widget", FORM_WIDGET_PARTIAL),
    ("non_zero", NON_ZERO_PARTIAL),
    ("query_form", QUERY_FORM_PARTIAL),
    ("form_dialog", FORM_DIALOG_PARTIAL),
    ("page_script", PAGE_SCRIPT_PARTIAL),
];
